//! Catalog operations: anime and episode CRUD, status toggles and the
//! availability-filtered listing.

use serde::Serialize;
use thiserror::Error;

use crate::constants::limits::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::db::StorageError;
use crate::domain::{
    AnimeId, AnimeStatus, AvailabilityFilter, AvailabilitySummary, EpisodeId, SignalPatch,
    WatchStatus,
};
use crate::models::{Anime, AnimePatch, Episode, EpisodePatch, NewAnime, NewEpisode};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Anime not found: {0}")]
    AnimeNotFound(AnimeId),

    #[error("Episode not found: {0}")]
    EpisodeNotFound(EpisodeId),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Constraint(msg) => Self::Conflict(msg),
            other @ StorageError::Backend(_) => Self::Storage(other),
        }
    }
}

/// Offset pagination shared by the anime and episode listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Page {
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Result<Self, CatalogError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(CatalogError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}, got {limit}"
            )));
        }
        Ok(Self {
            skip: skip.unwrap_or(0),
            limit,
        })
    }

    /// Applies the page to an already ordered list.
    #[must_use]
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(limit).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnimeListQuery {
    pub page: Page,
    pub availability: AvailabilityFilter,
    pub status: Option<AnimeStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeListItem {
    #[serde(flatten)]
    pub anime: Anime,
    pub availability: AvailabilitySummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimePage {
    pub items: Vec<AnimeListItem>,
    /// Number of anime matching the filters before pagination.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeDetail {
    #[serde(flatten)]
    pub anime: Anime,
    pub episodes: Vec<Episode>,
    pub availability: AvailabilitySummary,
}

pub(crate) fn validate_new_anime(input: &NewAnime) -> Result<(), CatalogError> {
    if input.title.trim().is_empty() {
        return Err(CatalogError::Validation("title is required".to_string()));
    }
    if input.episode_count.is_some_and(|c| c < 0) {
        return Err(CatalogError::Validation(
            "episode_count cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_episode_number(number: i32) -> Result<(), CatalogError> {
    if number <= 0 {
        return Err(CatalogError::Validation(format!(
            "episode number must be a positive integer, got {number}"
        )));
    }
    Ok(())
}

/// Catalog CRUD as seen by the HTTP and CLI layers.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_anime(&self, query: AnimeListQuery) -> Result<AnimePage, CatalogError>;

    /// Case-insensitive substring search over every title field.
    async fn search_anime(&self, query: &str) -> Result<Vec<Anime>, CatalogError>;

    async fn get_anime(&self, id: AnimeId) -> Result<AnimeDetail, CatalogError>;

    /// Creates an anime from user input.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Validation`] when the title is blank
    /// - [`CatalogError::Conflict`] when another anime already has this title
    async fn create_anime(&self, input: NewAnime) -> Result<Anime, CatalogError>;

    async fn update_anime(&self, id: AnimeId, patch: AnimePatch) -> Result<Anime, CatalogError>;

    async fn update_anime_status(
        &self,
        id: AnimeId,
        status: AnimeStatus,
    ) -> Result<Anime, CatalogError>;

    /// Deletes the anime and all of its episodes.
    async fn delete_anime(&self, id: AnimeId) -> Result<(), CatalogError>;

    async fn list_episodes(
        &self,
        anime_id: AnimeId,
        page: Page,
    ) -> Result<Vec<Episode>, CatalogError>;

    async fn get_episode(&self, id: EpisodeId) -> Result<Episode, CatalogError>;

    /// # Errors
    ///
    /// - [`CatalogError::Validation`] when the number is not positive
    /// - [`CatalogError::AnimeNotFound`] when the anime does not exist
    /// - [`CatalogError::Conflict`] when the number is already taken
    async fn create_episode(
        &self,
        anime_id: AnimeId,
        input: NewEpisode,
    ) -> Result<Episode, CatalogError>;

    async fn update_episode(
        &self,
        id: EpisodeId,
        patch: EpisodePatch,
    ) -> Result<Episode, CatalogError>;

    async fn update_episode_status(
        &self,
        id: EpisodeId,
        status: WatchStatus,
    ) -> Result<Episode, CatalogError>;

    /// Sets one or both availability signals; the other keeps its stored value.
    async fn update_episode_availability(
        &self,
        id: EpisodeId,
        signals: SignalPatch,
    ) -> Result<Episode, CatalogError>;

    async fn delete_episode(&self, id: EpisodeId) -> Result<(), CatalogError>;
}
