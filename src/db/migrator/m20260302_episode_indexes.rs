use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_episode_anime_number")
                    .table(Episode::Table)
                    .col(Episode::AnimeId)
                    .col(Episode::Number)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_episode_anime_id")
                    .table(Episode::Table)
                    .col(Episode::AnimeId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_anime_title")
                    .table(Anime::Table)
                    .col(Anime::Title)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_episode_anime_number")
                    .table(Episode::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_episode_anime_id")
                    .table(Episode::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_anime_title")
                    .table(Anime::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Episode {
    Table,
    AnimeId,
    Number,
}

#[derive(DeriveIden)]
enum Anime {
    Table,
    Title,
}
