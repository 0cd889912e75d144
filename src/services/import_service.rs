//! Import of an external detail page into the catalog.
//!
//! The anime is created first; every episode is then created on its own so a
//! bad episode only produces a warning. Nothing is rolled back.

use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::clients::{DetailScraper, ExternalSourceError, ScrapeResult};
use crate::db::CatalogStore;
use crate::models::{Anime, NewEpisode};
use crate::services::catalog_service::{CatalogError, validate_episode_number, validate_new_anime};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Failed to fetch external detail: {0}")]
    Fetch(#[source] ExternalSourceError),

    #[error("Failed to create anime: {0}")]
    Create(#[source] CatalogError),
}

/// A non-fatal problem with a single episode of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemWarning {
    pub episode_number: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedAnime {
    pub anime: Anime,
    pub episodes_attempted: usize,
    pub episodes_created: usize,
    pub warnings: Vec<ItemWarning>,
}

impl ImportedAnime {
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.episodes_created < self.episodes_attempted
    }
}

#[derive(Debug, Default)]
struct EpisodeTally {
    attempted: usize,
    created: usize,
    warnings: Vec<ItemWarning>,
}

fn validate_url(url: &str) -> Result<&str, ImportError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ImportError::Validation("url is required".to_string()));
    }
    Ok(trimmed)
}

pub struct ImportService {
    store: Arc<dyn CatalogStore>,
    scraper: Arc<dyn DetailScraper>,
}

impl ImportService {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, scraper: Arc<dyn DetailScraper>) -> Self {
        Self { store, scraper }
    }

    /// Fetches and parses a detail page without persisting anything.
    pub async fn preview(&self, url: &str) -> Result<ScrapeResult, ImportError> {
        let url = validate_url(url)?;
        self.scraper.fetch_detail(url).await.map_err(ImportError::Fetch)
    }

    /// Fetches `url` and imports the result.
    ///
    /// Importing the same page twice creates two anime; callers use the
    /// search annotations to avoid that.
    ///
    /// # Errors
    ///
    /// - [`ImportError::Fetch`] when the page cannot be fetched or parsed; nothing is written
    /// - [`ImportError::Create`] when the anime itself cannot be created
    pub async fn import_from_external(&self, url: &str) -> Result<ImportedAnime, ImportError> {
        let url = validate_url(url)?;
        info!(event = "import_started", url, "Importing from external source");

        let mut scraped = self.scraper.fetch_detail(url).await.map_err(|e| {
            warn!(event = "import_fetch_failed", url, error = %e, "Fetching detail failed");
            ImportError::Fetch(e)
        })?;
        if scraped.anime.source_url.is_none() {
            scraped.anime.source_url = Some(url.to_string());
        }

        self.import_scrape_result(scraped).await
    }

    /// Creates the anime, then each episode in source order.
    pub async fn import_scrape_result(
        &self,
        scraped: ScrapeResult,
    ) -> Result<ImportedAnime, ImportError> {
        let ScrapeResult { anime, episodes } = scraped;

        validate_new_anime(&anime).map_err(ImportError::Create)?;
        let anime = self
            .store
            .create_anime(&anime)
            .await
            .map_err(|e| ImportError::Create(e.into()))?;

        let tally = self.create_episodes(&anime, episodes).await;

        info!(
            event = "import_finished",
            anime_id = anime.id.value(),
            title = %anime.title,
            attempted = tally.attempted,
            created = tally.created,
            warnings = tally.warnings.len(),
            "Import finished"
        );

        Ok(ImportedAnime {
            anime,
            episodes_attempted: tally.attempted,
            episodes_created: tally.created,
            warnings: tally.warnings,
        })
    }

    async fn create_episodes(&self, anime: &Anime, episodes: Vec<NewEpisode>) -> EpisodeTally {
        let store = &self.store;
        let anime_id = anime.id;

        futures::stream::iter(episodes)
            .fold(EpisodeTally::default(), |mut tally, episode| async move {
                tally.attempted += 1;
                let number = episode.number;

                let outcome = match validate_episode_number(number) {
                    Ok(()) => store
                        .create_episode(anime_id, &episode)
                        .await
                        .map(|_| ())
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };

                match outcome {
                    Ok(()) => tally.created += 1,
                    Err(message) => {
                        warn!(
                            event = "import_episode_failed",
                            anime_id = anime_id.value(),
                            episode = number,
                            error = %message,
                            "Episode creation failed, continuing"
                        );
                        tally.warnings.push(ItemWarning {
                            episode_number: number,
                            message,
                        });
                    }
                }
                tally
            })
            .await
    }
}
