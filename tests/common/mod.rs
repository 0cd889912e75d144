//! Fakes shared by the integration tests.
#![allow(dead_code)]

use anishelf::clients::{DetailScraper, ExternalHit, ExternalSearch, ExternalSourceError, ScrapeResult};
use anishelf::db::{CatalogStore, StorageError, Store};
use anishelf::domain::{AnimeId, AvailabilitySummary, EpisodeId};
use anishelf::library::{FilesystemError, MediaFile, MediaScanner};
use anishelf::models::{Anime, AnimePatch, Episode, EpisodePatch, NewAnime, NewEpisode};
use anishelf::state::Collaborators;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub async fn memory_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("failed to open in-memory store")
}

pub fn hit(title: &str) -> ExternalHit {
    let slug = title.to_lowercase().replace(' ', "-");
    ExternalHit {
        id: slug.clone(),
        title: title.to_string(),
        url: format!("https://www.anime-loads.org/media/{slug}"),
        image_url: None,
    }
}

pub struct FakeSearch {
    result: Result<Vec<ExternalHit>, ExternalSourceError>,
}

impl FakeSearch {
    pub fn returning(hits: Vec<ExternalHit>) -> Arc<Self> {
        Arc::new(Self { result: Ok(hits) })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(ExternalSourceError::Network(message.to_string())),
        })
    }
}

#[async_trait]
impl ExternalSearch for FakeSearch {
    async fn search(&self, _query: &str) -> Result<Vec<ExternalHit>, ExternalSourceError> {
        self.result.clone()
    }
}

pub struct FakeScraper {
    result: Result<ScrapeResult, ExternalSourceError>,
}

impl FakeScraper {
    pub fn returning(result: ScrapeResult) -> Arc<Self> {
        Arc::new(Self { result: Ok(result) })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(ExternalSourceError::Network(message.to_string())),
        })
    }
}

#[async_trait]
impl DetailScraper for FakeScraper {
    async fn fetch_detail(&self, _url: &str) -> Result<ScrapeResult, ExternalSourceError> {
        self.result.clone()
    }
}

/// Returns a fixed file list regardless of the root.
pub struct FakeScanner {
    result: Result<Vec<MediaFile>, FilesystemError>,
}

impl FakeScanner {
    pub fn with_paths(paths: &[&str]) -> Arc<Self> {
        let files = paths
            .iter()
            .map(|p| MediaFile::from_path(PathBuf::from(p)))
            .collect();
        Arc::new(Self { result: Ok(files) })
    }

    pub fn with_files(files: Vec<MediaFile>) -> Arc<Self> {
        Arc::new(Self { result: Ok(files) })
    }

    pub fn failing(err: FilesystemError) -> Arc<Self> {
        Arc::new(Self { result: Err(err) })
    }
}

#[async_trait]
impl MediaScanner for FakeScanner {
    async fn list_media_files(&self, _root: &Path) -> Result<Vec<MediaFile>, FilesystemError> {
        self.result.clone()
    }
}

pub fn collaborators(
    search: Arc<FakeSearch>,
    scraper: Arc<FakeScraper>,
    scanner: Arc<FakeScanner>,
) -> Collaborators {
    Collaborators {
        external_search: search,
        detail_scraper: scraper,
        media_scanner: scanner,
    }
}

pub fn scraped(title: &str, episode_numbers: &[i32]) -> ScrapeResult {
    ScrapeResult {
        anime: NewAnime {
            source_url: Some(format!(
                "https://www.anime-loads.org/media/{}",
                title.to_lowercase().replace(' ', "-")
            )),
            ..NewAnime::titled(title)
        },
        episodes: episode_numbers
            .iter()
            .map(|&n| NewEpisode {
                title: Some(format!("Episode {n}")),
                available_online: true,
                ..NewEpisode::numbered(n)
            })
            .collect(),
    }
}

/// Delegates to a real store but fails episode creation for chosen numbers.
pub struct FlakyStore {
    inner: Store,
    failing_episode_numbers: Vec<i32>,
}

impl FlakyStore {
    pub fn new(inner: Store, failing_episode_numbers: &[i32]) -> Arc<Self> {
        Arc::new(Self {
            inner,
            failing_episode_numbers: failing_episode_numbers.to_vec(),
        })
    }
}

#[async_trait]
impl CatalogStore for FlakyStore {
    async fn get_anime_by_id(&self, id: AnimeId) -> Result<Option<Anime>, StorageError> {
        self.inner.get_anime_by_id(id).await
    }

    async fn list_all_anime(&self) -> Result<Vec<Anime>, StorageError> {
        self.inner.list_all_anime().await
    }

    async fn find_anime_by_title_substring(&self, query: &str) -> Result<Vec<Anime>, StorageError> {
        self.inner.find_anime_by_title_substring(query).await
    }

    async fn create_anime(&self, anime: &NewAnime) -> Result<Anime, StorageError> {
        self.inner.create_anime(anime).await
    }

    async fn update_anime(
        &self,
        id: AnimeId,
        patch: &AnimePatch,
    ) -> Result<Option<Anime>, StorageError> {
        self.inner.update_anime(id, patch).await
    }

    async fn delete_anime(&self, id: AnimeId) -> Result<bool, StorageError> {
        self.inner.delete_anime(id).await
    }

    async fn availability_summaries(
        &self,
    ) -> Result<HashMap<AnimeId, AvailabilitySummary>, StorageError> {
        self.inner.availability_summaries().await
    }

    async fn create_episode(
        &self,
        anime_id: AnimeId,
        episode: &NewEpisode,
    ) -> Result<Episode, StorageError> {
        if self.failing_episode_numbers.contains(&episode.number) {
            return Err(StorageError::Backend(format!(
                "injected failure for episode {}",
                episode.number
            )));
        }
        self.inner.create_episode(anime_id, episode).await
    }

    async fn get_episode_by_id(&self, id: EpisodeId) -> Result<Option<Episode>, StorageError> {
        self.inner.get_episode_by_id(id).await
    }

    async fn update_episode(
        &self,
        id: EpisodeId,
        patch: &EpisodePatch,
    ) -> Result<Option<Episode>, StorageError> {
        self.inner.update_episode(id, patch).await
    }

    async fn get_episodes_by_anime_id(
        &self,
        anime_id: AnimeId,
    ) -> Result<Vec<Episode>, StorageError> {
        self.inner.get_episodes_by_anime_id(anime_id).await
    }

    async fn delete_episode(&self, id: EpisodeId) -> Result<bool, StorageError> {
        self.inner.delete_episode(id).await
    }
}
