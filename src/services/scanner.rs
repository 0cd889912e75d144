//! Reconciliation of media files on disk with the catalog.
//!
//! Every file is matched to an anime by exact title and to an episode by
//! number. Matching only ever sets `owned_locally`; nothing the scan does
//! clears a signal, so running it again over the same tree changes nothing.

use futures::StreamExt;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{CatalogStore, StorageError};
use crate::domain::{AnimeId, title_matches};
use crate::library::{FilesystemError, MediaFile, MediaScanner};
use crate::models::{Anime, EpisodePatch, NewAnime, NewEpisode};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total_files_seen: usize,
    /// Distinct anime matched or created by this scan.
    pub matched_anime_count: usize,
    /// Episodes created, newly marked as owned, or given a new local path.
    pub updated_episode_count: usize,
    pub created_anime_count: usize,
    pub unmatched_files: Vec<String>,
    pub failed_files: Vec<FileFailure>,
}

enum FileOutcome {
    Unmatched,
    Matched { anime_id: AnimeId, changed: bool },
}

struct ScanState {
    catalog: Vec<Anime>,
    matched: HashSet<AnimeId>,
    summary: ScanSummary,
}

async fn path_exists(path: &str) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

pub struct ReconciliationService {
    store: Arc<dyn CatalogStore>,
    scanner: Arc<dyn MediaScanner>,
}

impl ReconciliationService {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, scanner: Arc<dyn MediaScanner>) -> Self {
        Self { store, scanner }
    }

    /// Walks `root` and records every recognised file as owned.
    ///
    /// With `create_missing`, files whose title matches no anime create one
    /// (status plan-to-watch); otherwise they are reported as unmatched.
    ///
    /// # Errors
    ///
    /// Fails as a whole only when `root` cannot be listed or the catalog
    /// cannot be loaded. Problems with single files end up in the summary.
    pub async fn scan_and_reconcile(
        &self,
        root: &Path,
        create_missing: bool,
    ) -> Result<ScanSummary, ScanError> {
        if root.as_os_str().is_empty() {
            return Err(ScanError::Validation("scan path is required".to_string()));
        }

        info!(
            event = "scan_started",
            path = %root.display(),
            create_missing,
            "Scanning library"
        );

        let files = self.scanner.list_media_files(root).await?;
        let catalog = self.store.list_all_anime().await?;

        let initial = ScanState {
            catalog,
            matched: HashSet::new(),
            summary: ScanSummary::default(),
        };

        let state = futures::stream::iter(files)
            .fold(initial, |mut state, file| async move {
                state.summary.total_files_seen += 1;
                let path = file.path.display().to_string();

                match self.reconcile_file(&mut state, &file, create_missing).await {
                    Ok(FileOutcome::Unmatched) => {
                        debug!(path = %path, "No catalog match for file");
                        state.summary.unmatched_files.push(path);
                    }
                    Ok(FileOutcome::Matched { anime_id, changed }) => {
                        state.matched.insert(anime_id);
                        if changed {
                            state.summary.updated_episode_count += 1;
                        }
                    }
                    Err(err) => {
                        warn!(
                            event = "scan_file_failed",
                            path = %path,
                            error = %err,
                            "Failed to reconcile file, continuing"
                        );
                        state.summary.failed_files.push(FileFailure {
                            path,
                            message: err.to_string(),
                        });
                    }
                }
                state
            })
            .await;

        let mut summary = state.summary;
        summary.matched_anime_count = state.matched.len();

        info!(
            event = "scan_finished",
            path = %root.display(),
            files = summary.total_files_seen,
            matched_anime = summary.matched_anime_count,
            updated_episodes = summary.updated_episode_count,
            created_anime = summary.created_anime_count,
            unmatched = summary.unmatched_files.len(),
            failed = summary.failed_files.len(),
            "Library scan finished"
        );

        Ok(summary)
    }

    async fn reconcile_file(
        &self,
        state: &mut ScanState,
        file: &MediaFile,
        create_missing: bool,
    ) -> Result<FileOutcome, StorageError> {
        let (Some(title), Some(number)) = (&file.inferred_title, file.inferred_episode_number)
        else {
            return Ok(FileOutcome::Unmatched);
        };

        let existing = state
            .catalog
            .iter()
            .find(|anime| title_matches(title, &anime.known_titles()))
            .map(|anime| anime.id);

        let anime_id = match existing {
            Some(id) => id,
            None if create_missing => {
                let created = self.store.create_anime(&NewAnime::titled(title)).await?;
                info!(
                    event = "scan_created_anime",
                    anime_id = created.id.value(),
                    title = %created.title,
                    "Created anime for unmatched files"
                );
                let id = created.id;
                state.catalog.push(created);
                state.summary.created_anime_count += 1;
                id
            }
            None => return Ok(FileOutcome::Unmatched),
        };

        let local_path = file.path.display().to_string();
        let episodes = self.store.get_episodes_by_anime_id(anime_id).await?;

        let changed = match episodes.iter().find(|e| e.number == number) {
            Some(episode) => {
                let replace_path = match episode.local_path.as_deref() {
                    None => true,
                    Some(recorded) if recorded == local_path => false,
                    // A second copy of the same episode keeps the recorded path.
                    Some(recorded) => !path_exists(recorded).await,
                };
                if episode.owned_locally && !replace_path {
                    return Ok(FileOutcome::Matched {
                        anime_id,
                        changed: false,
                    });
                }
                let patch = EpisodePatch {
                    owned_locally: Some(true),
                    local_path: replace_path.then(|| local_path.clone()),
                    ..EpisodePatch::default()
                };
                self.store.update_episode(episode.id, &patch).await?;
                true
            }
            None => {
                let episode = NewEpisode {
                    title: Some(format!("Episode {number}")),
                    owned_locally: true,
                    local_path: Some(local_path),
                    ..NewEpisode::numbered(number)
                };
                self.store.create_episode(anime_id, &episode).await?;
                true
            }
        };

        Ok(FileOutcome::Matched { anime_id, changed })
    }
}
