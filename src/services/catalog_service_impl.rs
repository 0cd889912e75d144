//! [`CatalogService`] over any [`CatalogStore`].

use std::sync::Arc;
use tracing::info;

use crate::db::CatalogStore;
use crate::domain::{
    AnimeId, AnimeStatus, AvailabilitySummary, EpisodeId, SignalPatch, WatchStatus,
};
use crate::models::{Anime, AnimePatch, Episode, EpisodePatch, NewAnime, NewEpisode};
use crate::services::catalog_service::{
    AnimeDetail, AnimeListItem, AnimeListQuery, AnimePage, CatalogError, CatalogService, Page,
    validate_episode_number, validate_new_anime,
};

pub struct StoreCatalogService {
    store: Arc<dyn CatalogStore>,
}

impl StoreCatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    async fn require_anime(&self, id: AnimeId) -> Result<Anime, CatalogError> {
        self.store
            .get_anime_by_id(id)
            .await?
            .ok_or(CatalogError::AnimeNotFound(id))
    }

    async fn require_episode(&self, id: EpisodeId) -> Result<Episode, CatalogError> {
        self.store
            .get_episode_by_id(id)
            .await?
            .ok_or(CatalogError::EpisodeNotFound(id))
    }

    /// Rejects `title` when another anime already uses it as primary title.
    async fn ensure_title_free(
        &self,
        title: &str,
        except: Option<AnimeId>,
    ) -> Result<(), CatalogError> {
        let wanted = title.trim().to_lowercase();
        let taken = self
            .store
            .list_all_anime()
            .await?
            .into_iter()
            .any(|a| Some(a.id) != except && a.title.trim().to_lowercase() == wanted);
        if taken {
            return Err(CatalogError::Conflict(format!(
                "an anime titled '{}' already exists",
                title.trim()
            )));
        }
        Ok(())
    }

    async fn ensure_number_free(
        &self,
        anime_id: AnimeId,
        number: i32,
        except: Option<EpisodeId>,
    ) -> Result<(), CatalogError> {
        let taken = self
            .store
            .get_episodes_by_anime_id(anime_id)
            .await?
            .iter()
            .any(|e| Some(e.id) != except && e.number == number);
        if taken {
            return Err(CatalogError::Conflict(format!(
                "episode {number} already exists for anime {anime_id}"
            )));
        }
        Ok(())
    }

    async fn patch_episode(
        &self,
        id: EpisodeId,
        patch: &EpisodePatch,
    ) -> Result<Episode, CatalogError> {
        self.store
            .update_episode(id, patch)
            .await?
            .ok_or(CatalogError::EpisodeNotFound(id))
    }
}

#[async_trait::async_trait]
impl CatalogService for StoreCatalogService {
    async fn list_anime(&self, query: AnimeListQuery) -> Result<AnimePage, CatalogError> {
        let (anime, summaries) = tokio::try_join!(
            self.store.list_all_anime(),
            self.store.availability_summaries()
        )?;

        let matching: Vec<AnimeListItem> = anime
            .into_iter()
            .filter(|a| query.status.is_none_or(|s| a.status == s))
            .map(|anime| {
                let availability = summaries.get(&anime.id).copied().unwrap_or_default();
                AnimeListItem {
                    anime,
                    availability,
                }
            })
            .filter(|item| query.availability.matches(&item.availability))
            .collect();

        let total = matching.len();
        Ok(AnimePage {
            items: query.page.slice(matching),
            total,
        })
    }

    async fn search_anime(&self, query: &str) -> Result<Vec<Anime>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::Validation(
                "search query cannot be empty".to_string(),
            ));
        }
        Ok(self.store.find_anime_by_title_substring(query).await?)
    }

    async fn get_anime(&self, id: AnimeId) -> Result<AnimeDetail, CatalogError> {
        let anime = self.require_anime(id).await?;
        let episodes = self.store.get_episodes_by_anime_id(id).await?;
        let availability =
            AvailabilitySummary::from_states(episodes.iter().map(|e| e.availability));
        Ok(AnimeDetail {
            anime,
            episodes,
            availability,
        })
    }

    async fn create_anime(&self, input: NewAnime) -> Result<Anime, CatalogError> {
        validate_new_anime(&input)?;
        self.ensure_title_free(&input.title, None).await?;
        Ok(self.store.create_anime(&input).await?)
    }

    async fn update_anime(&self, id: AnimeId, patch: AnimePatch) -> Result<Anime, CatalogError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(CatalogError::Validation("title cannot be empty".to_string()));
            }
            self.ensure_title_free(title, Some(id)).await?;
        }
        if patch.episode_count.is_some_and(|c| c < 0) {
            return Err(CatalogError::Validation(
                "episode_count cannot be negative".to_string(),
            ));
        }

        self.store
            .update_anime(id, &patch)
            .await?
            .ok_or(CatalogError::AnimeNotFound(id))
    }

    async fn update_anime_status(
        &self,
        id: AnimeId,
        status: AnimeStatus,
    ) -> Result<Anime, CatalogError> {
        self.update_anime(id, AnimePatch::status(status)).await
    }

    async fn delete_anime(&self, id: AnimeId) -> Result<(), CatalogError> {
        if !self.store.delete_anime(id).await? {
            return Err(CatalogError::AnimeNotFound(id));
        }
        info!(anime_id = id.value(), "Deleted anime and its episodes");
        Ok(())
    }

    async fn list_episodes(
        &self,
        anime_id: AnimeId,
        page: Page,
    ) -> Result<Vec<Episode>, CatalogError> {
        self.require_anime(anime_id).await?;
        let episodes = self.store.get_episodes_by_anime_id(anime_id).await?;
        Ok(page.slice(episodes))
    }

    async fn get_episode(&self, id: EpisodeId) -> Result<Episode, CatalogError> {
        self.require_episode(id).await
    }

    async fn create_episode(
        &self,
        anime_id: AnimeId,
        input: NewEpisode,
    ) -> Result<Episode, CatalogError> {
        validate_episode_number(input.number)?;
        self.require_anime(anime_id).await?;
        self.ensure_number_free(anime_id, input.number, None).await?;
        Ok(self.store.create_episode(anime_id, &input).await?)
    }

    async fn update_episode(
        &self,
        id: EpisodeId,
        patch: EpisodePatch,
    ) -> Result<Episode, CatalogError> {
        if let Some(number) = patch.number {
            validate_episode_number(number)?;
            let current = self.require_episode(id).await?;
            if current.number != number {
                self.ensure_number_free(current.anime_id, number, Some(id))
                    .await?;
            }
        }
        self.patch_episode(id, &patch).await
    }

    async fn update_episode_status(
        &self,
        id: EpisodeId,
        status: WatchStatus,
    ) -> Result<Episode, CatalogError> {
        let patch = EpisodePatch {
            watch_status: Some(status),
            ..EpisodePatch::default()
        };
        self.patch_episode(id, &patch).await
    }

    async fn update_episode_availability(
        &self,
        id: EpisodeId,
        signals: SignalPatch,
    ) -> Result<Episode, CatalogError> {
        if signals.is_empty() {
            return Err(CatalogError::Validation(
                "at least one of owned_locally or available_online is required".to_string(),
            ));
        }
        let patch = EpisodePatch {
            owned_locally: signals.owned_locally,
            available_online: signals.available_online,
            ..EpisodePatch::default()
        };
        self.patch_episode(id, &patch).await
    }

    async fn delete_episode(&self, id: EpisodeId) -> Result<(), CatalogError> {
        if !self.store.delete_episode(id).await? {
            return Err(CatalogError::EpisodeNotFound(id));
        }
        Ok(())
    }
}
