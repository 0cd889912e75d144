use crate::domain::{AnimeId, AvailabilitySummary, EpisodeId};
use crate::models::{Anime, AnimePatch, Episode, EpisodePatch, NewAnime, NewEpisode};
use async_trait::async_trait;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

/// Failure of the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Store unreachable, I/O or query failure.
    #[error("storage unavailable: {0}")]
    Backend(String),

    /// A uniqueness or foreign key rule rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(
                SqlErr::UniqueConstraintViolation(msg) | SqlErr::ForeignKeyConstraintViolation(msg),
            ) => Self::Constraint(msg),
            _ => Self::Backend(err.to_string()),
        }
    }
}

/// The single read/write interface every service goes through.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_anime_by_id(&self, id: AnimeId) -> Result<Option<Anime>, StorageError>;

    /// Every anime ordered by title.
    async fn list_all_anime(&self) -> Result<Vec<Anime>, StorageError>;

    async fn find_anime_by_title_substring(&self, query: &str)
    -> Result<Vec<Anime>, StorageError>;

    async fn create_anime(&self, anime: &NewAnime) -> Result<Anime, StorageError>;

    async fn update_anime(
        &self,
        id: AnimeId,
        patch: &AnimePatch,
    ) -> Result<Option<Anime>, StorageError>;

    async fn delete_anime(&self, id: AnimeId) -> Result<bool, StorageError>;

    /// Availability counts keyed by anime; anime without episodes are absent.
    async fn availability_summaries(
        &self,
    ) -> Result<HashMap<AnimeId, AvailabilitySummary>, StorageError>;

    async fn create_episode(
        &self,
        anime_id: AnimeId,
        episode: &NewEpisode,
    ) -> Result<Episode, StorageError>;

    async fn get_episode_by_id(&self, id: EpisodeId) -> Result<Option<Episode>, StorageError>;

    /// Read-modify-write of one episode; the availability state is
    /// recomputed from the merged signals.
    async fn update_episode(
        &self,
        id: EpisodeId,
        patch: &EpisodePatch,
    ) -> Result<Option<Episode>, StorageError>;

    /// Episodes of one anime ordered by number.
    async fn get_episodes_by_anime_id(
        &self,
        anime_id: AnimeId,
    ) -> Result<Vec<Episode>, StorageError>;

    async fn delete_episode(&self, id: EpisodeId) -> Result<bool, StorageError>;
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> anyhow::Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // An in-memory database lives only as long as its connections, so
        // keep exactly one open for the lifetime of the pool.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        conn.execute(Statement::from_string(
            conn.get_database_backend(),
            "PRAGMA foreign_keys = ON".to_string(),
        ))
        .await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<(), StorageError> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub(crate) fn anime_repo(&self) -> repositories::anime::AnimeRepository {
        repositories::anime::AnimeRepository::new(self.conn.clone())
    }

    pub(crate) fn episode_repo(&self) -> repositories::episode::EpisodeRepository {
        repositories::episode::EpisodeRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl CatalogStore for Store {
    async fn get_anime_by_id(&self, id: AnimeId) -> Result<Option<Anime>, StorageError> {
        self.anime_repo().get(id).await
    }

    async fn list_all_anime(&self) -> Result<Vec<Anime>, StorageError> {
        self.anime_repo().list_all().await
    }

    async fn find_anime_by_title_substring(
        &self,
        query: &str,
    ) -> Result<Vec<Anime>, StorageError> {
        self.anime_repo().search_titles(query).await
    }

    async fn create_anime(&self, anime: &NewAnime) -> Result<Anime, StorageError> {
        self.anime_repo().create(anime).await
    }

    async fn update_anime(
        &self,
        id: AnimeId,
        patch: &AnimePatch,
    ) -> Result<Option<Anime>, StorageError> {
        self.anime_repo().update(id, patch).await
    }

    async fn delete_anime(&self, id: AnimeId) -> Result<bool, StorageError> {
        self.anime_repo().remove(id).await
    }

    async fn availability_summaries(
        &self,
    ) -> Result<HashMap<AnimeId, AvailabilitySummary>, StorageError> {
        self.anime_repo().availability_summaries().await
    }

    async fn create_episode(
        &self,
        anime_id: AnimeId,
        episode: &NewEpisode,
    ) -> Result<Episode, StorageError> {
        self.episode_repo().create(anime_id, episode).await
    }

    async fn get_episode_by_id(&self, id: EpisodeId) -> Result<Option<Episode>, StorageError> {
        self.episode_repo().get(id).await
    }

    async fn update_episode(
        &self,
        id: EpisodeId,
        patch: &EpisodePatch,
    ) -> Result<Option<Episode>, StorageError> {
        self.episode_repo().update(id, patch).await
    }

    async fn get_episodes_by_anime_id(
        &self,
        anime_id: AnimeId,
    ) -> Result<Vec<Episode>, StorageError> {
        self.episode_repo().list_for_anime(anime_id).await
    }

    async fn delete_episode(&self, id: EpisodeId) -> Result<bool, StorageError> {
        self.episode_repo().remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnimeStatus;

    #[tokio::test]
    async fn title_substring_search_covers_alternate_titles() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store
            .create_anime(&NewAnime {
                title_english: Some("Attack on Titan".into()),
                synonyms: Some("AoT, SnK".into()),
                ..NewAnime::titled("Shingeki no Kyojin")
            })
            .await
            .unwrap();
        store
            .create_anime(&NewAnime::titled("Naruto"))
            .await
            .unwrap();

        let by_english = store.find_anime_by_title_substring("titan").await.unwrap();
        assert_eq!(by_english.len(), 1);
        assert_eq!(by_english[0].title, "Shingeki no Kyojin");

        let by_synonym = store.find_anime_by_title_substring("snk").await.unwrap();
        assert_eq!(by_synonym.len(), 1);

        assert!(store.find_anime_by_title_substring("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn anime_patch_only_touches_present_fields() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let created = store
            .create_anime(&NewAnime {
                year: Some(2023),
                genres: vec!["Fantasy".into()],
                ..NewAnime::titled("Frieren")
            })
            .await
            .unwrap();

        let updated = store
            .update_anime(created.id, &AnimePatch::status(AnimeStatus::Watching))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, AnimeStatus::Watching);
        assert_eq!(updated.year, Some(2023));
        assert_eq!(updated.genres, vec!["Fantasy".to_string()]);
        assert_eq!(updated.title, "Frieren");
    }

    #[tokio::test]
    async fn summaries_group_by_anime() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let anime = store
            .create_anime(&NewAnime::titled("Mushishi"))
            .await
            .unwrap();
        store
            .create_episode(
                anime.id,
                &NewEpisode {
                    owned_locally: true,
                    ..NewEpisode::numbered(1)
                },
            )
            .await
            .unwrap();
        store
            .create_episode(anime.id, &NewEpisode::numbered(2))
            .await
            .unwrap();

        let summaries = store.availability_summaries().await.unwrap();
        let summary = summaries[&anime.id];
        assert_eq!(summary.total, 2);
        assert_eq!(summary.owned, 1);
        assert_eq!(summary.not_available, 1);
    }

    #[test]
    fn db_errors_map_to_backend() {
        let err = StorageError::from(DbErr::Custom("boom".into()));
        assert!(matches!(err, StorageError::Backend(_)));
    }

    #[tokio::test]
    async fn migrations_create_catalog_indexes() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let backend = store.conn.get_database_backend();
        let rows = store
            .conn
            .query_all(Statement::from_string(
                backend,
                "SELECT name FROM sqlite_master WHERE type = 'index'".to_string(),
            ))
            .await
            .unwrap();
        let names: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String>("", "name").unwrap())
            .collect();

        for expected in ["idx_episode_anime_number", "idx_episode_anime_id", "idx_anime_title"] {
            assert!(names.iter().any(|n| n == expected), "missing index {expected}");
        }
    }

    #[tokio::test]
    async fn title_search_folds_non_ascii_case() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store
            .create_anime(&NewAnime::titled("Ölmädchen Über Alles"))
            .await
            .unwrap();
        store
            .create_anime(&NewAnime::titled("Naruto"))
            .await
            .unwrap();

        let hits = store.find_anime_by_title_substring("über").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Ölmädchen Über Alles");

        let hits = store.find_anime_by_title_substring("ÖLMÄDCHEN").await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn title_search_treats_wildcards_literally() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store
            .create_anime(&NewAnime::titled("Naruto"))
            .await
            .unwrap();
        store
            .create_anime(&NewAnime::titled("100% Pascal-sensei"))
            .await
            .unwrap();

        let percent = store.find_anime_by_title_substring("%").await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].title, "100% Pascal-sensei");

        assert!(store.find_anime_by_title_substring("n_ruto").await.unwrap().is_empty());
        assert!(store.find_anime_by_title_substring("\\").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn summaries_follow_signal_updates() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let anime = store
            .create_anime(&NewAnime::titled("Dandadan"))
            .await
            .unwrap();
        let episode = store
            .create_episode(
                anime.id,
                &NewEpisode {
                    available_online: true,
                    ..NewEpisode::numbered(1)
                },
            )
            .await
            .unwrap();

        let before = store.availability_summaries().await.unwrap()[&anime.id];
        assert_eq!(before.available_online, 1);

        let patch = EpisodePatch {
            owned_locally: Some(true),
            ..EpisodePatch::default()
        };
        store.update_episode(episode.id, &patch).await.unwrap();

        let after = store.availability_summaries().await.unwrap()[&anime.id];
        assert_eq!(after.available_online, 0);
        assert_eq!(after.owned_and_available_online, 1);
        assert_eq!(after.total, 1);
    }
}
