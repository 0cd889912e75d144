//! Combined local and external search.
//!
//! External hits are tagged with the local anime they already correspond to,
//! using exact title matching. A failing external source degrades the combined
//! result instead of failing it.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::clients::{ExternalHit, ExternalSearch, ExternalSourceError};
use crate::db::{CatalogStore, StorageError};
use crate::domain::{AnimeId, title_matches};
use crate::models::Anime;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("External source failed: {0}")]
    External(#[from] ExternalSourceError),
}

/// An external hit after comparison with the local catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalSearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub already_in_catalog: bool,
    pub catalog_anime_id: Option<AnimeId>,
    pub catalog_updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedSearchResponse {
    pub local_results: Vec<Anime>,
    pub external_results: Vec<ExternalSearchResult>,
    /// Set when the external source failed; `external_results` is then empty.
    pub external_error: Option<String>,
}

/// Tags each hit with the first catalog entry whose title set matches it.
#[must_use]
pub fn annotate(hits: Vec<ExternalHit>, catalog: &[Anime]) -> Vec<ExternalSearchResult> {
    hits.into_iter()
        .map(|hit| {
            let owned = catalog
                .iter()
                .find(|anime| title_matches(&hit.title, &anime.known_titles()));
            ExternalSearchResult {
                already_in_catalog: owned.is_some(),
                catalog_anime_id: owned.map(|a| a.id),
                catalog_updated_at: owned.map(|a| a.updated_at.clone()),
                id: hit.id,
                title: hit.title,
                url: hit.url,
                image_url: hit.image_url,
            }
        })
        .collect()
}

fn validate_query(query: &str) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::Validation(
            "search query cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

pub struct SearchService {
    store: Arc<dyn CatalogStore>,
    external: Arc<dyn ExternalSearch>,
}

impl SearchService {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, external: Arc<dyn ExternalSearch>) -> Self {
        Self { store, external }
    }

    /// Local title search plus annotated external hits.
    ///
    /// # Errors
    ///
    /// Fails only when the local store fails; an external failure is reported
    /// through [`CombinedSearchResponse::external_error`].
    pub async fn combined_search(&self, query: &str) -> Result<CombinedSearchResponse, SearchError> {
        let query = validate_query(query)?;

        let (local, catalog, external) = tokio::join!(
            self.store.find_anime_by_title_substring(query),
            self.store.list_all_anime(),
            self.external.search(query)
        );
        let local_results = local?;

        let (external_results, external_error) = match external {
            Ok(hits) => (annotate(hits, &catalog?), None),
            Err(err) => {
                warn!(
                    event = "external_search_failed",
                    query,
                    error = %err,
                    "External search failed, returning local results only"
                );
                (Vec::new(), Some(err.to_string()))
            }
        };

        info!(
            event = "combined_search",
            query,
            local = local_results.len(),
            external = external_results.len(),
            degraded = external_error.is_some(),
            "Combined search finished"
        );

        Ok(CombinedSearchResponse {
            local_results,
            external_results,
            external_error,
        })
    }

    /// External hits only, still annotated against the catalog.
    pub async fn external_search(
        &self,
        query: &str,
    ) -> Result<Vec<ExternalSearchResult>, SearchError> {
        let query = validate_query(query)?;
        let hits = self.external.search(query).await?;
        let catalog = self.store.list_all_anime().await?;
        Ok(annotate(hits, &catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anime(id: i32, title: &str, synonyms: Option<&str>) -> Anime {
        Anime {
            id: AnimeId::new(id),
            title: title.to_string(),
            title_original: None,
            title_romanized: None,
            title_english: None,
            synonyms: synonyms.map(ToString::to_string),
            status: crate::domain::AnimeStatus::default(),
            description: None,
            year: None,
            kind: None,
            genres: Vec::new(),
            runtime: None,
            episode_count: None,
            source_url: None,
            cover_image_url: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: format!("2026-01-0{id}T00:00:00+00:00"),
        }
    }

    fn hit(title: &str) -> ExternalHit {
        ExternalHit {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            url: format!("https://www.anime-loads.org/media/{}", title.to_lowercase()),
            image_url: None,
        }
    }

    #[test]
    fn annotate_marks_owned_hits() {
        let catalog = vec![
            anime(1, "One Piece", None),
            anime(2, "My Hero Academia", Some("boku no hero, mha")),
        ];
        let results = annotate(
            vec![hit("ONE PIECE"), hit("Boku no Hero"), hit("Naruto")],
            &catalog,
        );

        assert!(results[0].already_in_catalog);
        assert_eq!(results[0].catalog_anime_id, Some(AnimeId::new(1)));
        assert_eq!(
            results[0].catalog_updated_at.as_deref(),
            Some("2026-01-01T00:00:00+00:00")
        );
        assert_eq!(results[1].catalog_anime_id, Some(AnimeId::new(2)));
        assert!(!results[2].already_in_catalog);
        assert!(results[2].catalog_anime_id.is_none());
        assert!(results[2].catalog_updated_at.is_none());
    }

    #[test]
    fn annotate_does_not_fuzzy_match() {
        let results = annotate(vec![hit("One-Piece")], &[anime(1, "One Piece", None)]);
        assert!(!results[0].already_in_catalog);
    }

    #[test]
    fn blank_query_is_rejected() {
        assert!(matches!(validate_query("  "), Err(SearchError::Validation(_))));
        assert_eq!(validate_query(" naruto ").unwrap(), "naruto");
    }
}
