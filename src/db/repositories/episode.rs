use crate::domain::{AnimeId, AvailabilitySignals, EpisodeId, resolve};
use crate::entities::{episode, prelude::*};
use crate::models::{Episode as EpisodeRecord, EpisodePatch, NewEpisode};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

use super::super::StorageError;

pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: episode::Model) -> EpisodeRecord {
        EpisodeRecord {
            id: EpisodeId::new(model.id),
            anime_id: AnimeId::new(model.anime_id),
            number: model.number,
            title: model.title,
            watch_status: model.watch_status.parse().unwrap_or_default(),
            owned_locally: model.owned_locally,
            available_online: model.available_online,
            availability: resolve(model.owned_locally, model.available_online),
            stream_url: model.stream_url,
            local_path: model.local_path,
            air_date: model.air_date,
            source_url: model.source_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn get(&self, id: EpisodeId) -> Result<Option<EpisodeRecord>, StorageError> {
        let model = Episode::find_by_id(id.value()).one(&self.conn).await?;
        Ok(model.map(Self::map_model))
    }

    pub async fn list_for_anime(
        &self,
        anime_id: AnimeId,
    ) -> Result<Vec<EpisodeRecord>, StorageError> {
        let rows = Episode::find()
            .filter(episode::Column::AnimeId.eq(anime_id.value()))
            .order_by_asc(episode::Column::Number)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn create(
        &self,
        anime_id: AnimeId,
        input: &NewEpisode,
    ) -> Result<EpisodeRecord, StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        let active_model = episode::ActiveModel {
            anime_id: Set(anime_id.value()),
            number: Set(input.number),
            title: Set(input.title.clone()),
            watch_status: Set(input.watch_status.as_str().to_string()),
            owned_locally: Set(input.owned_locally),
            available_online: Set(input.available_online),
            availability: Set(input.availability().as_str().to_string()),
            stream_url: Set(input.stream_url.clone()),
            local_path: Set(input.local_path.clone()),
            air_date: Set(input.air_date.clone()),
            source_url: Set(input.source_url.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.conn).await?;
        debug!(
            anime_id = model.anime_id,
            episode = model.number,
            "Created episode"
        );
        Ok(Self::map_model(model))
    }

    /// Applies `patch` inside a transaction.
    ///
    /// The stored signals are read first, the patched ones are merged over
    /// them and the composite state is recomputed from the merged pair. Only
    /// columns present in the patch, the derived state and `updated_at` are
    /// written.
    pub async fn update(
        &self,
        id: EpisodeId,
        patch: &EpisodePatch,
    ) -> Result<Option<EpisodeRecord>, StorageError> {
        let txn = self.conn.begin().await?;

        let Some(model) = Episode::find_by_id(id.value()).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let merged = AvailabilitySignals::new(model.owned_locally, model.available_online)
            .apply(patch.signal_patch());

        let mut active: episode::ActiveModel = model.into();
        if let Some(number) = patch.number {
            active.number = Set(number);
        }
        if let Some(title) = &patch.title {
            active.title = Set(Some(title.clone()));
        }
        if let Some(status) = patch.watch_status {
            active.watch_status = Set(status.as_str().to_string());
        }
        if let Some(owned) = patch.owned_locally {
            active.owned_locally = Set(owned);
        }
        if let Some(online) = patch.available_online {
            active.available_online = Set(online);
        }
        active.availability = Set(merged.state().as_str().to_string());
        if let Some(v) = &patch.stream_url {
            active.stream_url = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.local_path {
            active.local_path = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.air_date {
            active.air_date = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.source_url {
            active.source_url = Set(Some(v.clone()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&txn).await?;
        txn.commit().await?;

        Ok(Some(Self::map_model(model)))
    }

    pub async fn remove(&self, id: EpisodeId) -> Result<bool, StorageError> {
        let result = Episode::delete_by_id(id.value()).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::domain::AvailabilityState;
    use crate::models::NewAnime;

    async fn setup() -> (Store, AnimeId) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let anime = store
            .anime_repo()
            .create(&NewAnime::titled("Frieren"))
            .await
            .unwrap();
        (store, anime.id)
    }

    #[tokio::test]
    async fn signal_patch_keeps_the_other_signal() {
        let (store, anime_id) = setup().await;
        let repo = store.episode_repo();
        let created = repo
            .create(
                anime_id,
                &NewEpisode {
                    available_online: true,
                    ..NewEpisode::numbered(1)
                },
            )
            .await
            .unwrap();
        assert_eq!(created.availability, AvailabilityState::AvailableOnline);

        let patch = EpisodePatch {
            owned_locally: Some(true),
            ..EpisodePatch::default()
        };
        let updated = repo.update(created.id, &patch).await.unwrap().unwrap();

        assert!(updated.available_online);
        assert!(updated.owned_locally);
        assert_eq!(
            updated.availability,
            AvailabilityState::OwnedAndAvailableOnline
        );
    }

    #[tokio::test]
    async fn duplicate_number_is_a_constraint_error() {
        let (store, anime_id) = setup().await;
        let repo = store.episode_repo();
        repo.create(anime_id, &NewEpisode::numbered(3)).await.unwrap();

        let err = repo
            .create(anime_id, &NewEpisode::numbered(3))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)), "{err:?}");
    }

    #[tokio::test]
    async fn update_of_missing_episode_returns_none() {
        let (store, _) = setup().await;
        let result = store
            .episode_repo()
            .update(EpisodeId::new(999), &EpisodePatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn removing_anime_removes_episodes() {
        let (store, anime_id) = setup().await;
        let episode = store
            .episode_repo()
            .create(anime_id, &NewEpisode::numbered(1))
            .await
            .unwrap();

        assert!(store.anime_repo().remove(anime_id).await.unwrap());
        assert!(store.episode_repo().get(episode.id).await.unwrap().is_none());
    }
}
