//! External catalog collaborators.
//!
//! Services only see the [`ExternalSearch`] and [`DetailScraper`] traits; the
//! anime-loads HTML client is the production implementation.

pub mod anime_loads;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{NewAnime, NewEpisode};

pub use anime_loads::AnimeLoadsClient;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalSourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse page: {0}")]
    Parse(String),

    #[error("invalid url '{0}'")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ExternalSourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// One raw search hit from the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalHit {
    pub id: String,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
}

/// A fully scraped detail page: the anime and its episodes in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub anime: NewAnime,
    pub episodes: Vec<NewEpisode>,
}

#[async_trait]
pub trait ExternalSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<ExternalHit>, ExternalSourceError>;
}

#[async_trait]
pub trait DetailScraper: Send + Sync {
    async fn fetch_detail(&self, url: &str) -> Result<ScrapeResult, ExternalSourceError>;
}
