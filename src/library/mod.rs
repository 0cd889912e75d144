//! Filesystem side of reconciliation: finding media files under a root.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::parser::parse_media_path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilesystemError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("filesystem error: {0}")]
    Io(String),
}

impl FilesystemError {
    fn from_io(path: &Path, err: &std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(format!("{}: {err}", path.display())),
        }
    }
}

/// A discovered file with whatever could be inferred from its name.
///
/// Both inferred fields are `None` when the entry could not be read or its
/// name could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub inferred_title: Option<String>,
    pub inferred_episode_number: Option<i32>,
}

impl MediaFile {
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let parsed = parse_media_path(&path);
        Self {
            inferred_title: parsed.as_ref().map(|p| p.title.clone()),
            inferred_episode_number: parsed.map(|p| p.episode),
            path,
        }
    }

    #[must_use]
    pub const fn unreadable(path: PathBuf) -> Self {
        Self {
            path,
            inferred_title: None,
            inferred_episode_number: None,
        }
    }
}

#[async_trait]
pub trait MediaScanner: Send + Sync {
    async fn list_media_files(&self, root: &Path) -> Result<Vec<MediaFile>, FilesystemError>;
}

/// Recursive directory walk filtered by video extension.
#[derive(Debug, Clone)]
pub struct WalkdirScanner {
    extensions: Vec<String>,
}

impl WalkdirScanner {
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

#[async_trait]
impl MediaScanner for WalkdirScanner {
    async fn list_media_files(&self, root: &Path) -> Result<Vec<MediaFile>, FilesystemError> {
        let metadata = tokio::fs::metadata(root)
            .await
            .map_err(|e| FilesystemError::from_io(root, &e))?;
        if !metadata.is_dir() {
            return Err(FilesystemError::NotADirectory(root.to_path_buf()));
        }

        let (tx, mut rx) = tokio::sync::mpsc::channel(100);
        let scan_path = root.to_path_buf();

        // Offload blocking I/O to a dedicated thread
        let walker = tokio::task::spawn_blocking(move || {
            let entries = walkdir::WalkDir::new(&scan_path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter();

            for entry in entries {
                let item = match entry {
                    Ok(entry) if entry.file_type().is_file() => Ok(entry.into_path()),
                    Ok(_) => continue,
                    Err(err) => match err.path() {
                        Some(path) => Err(path.to_path_buf()),
                        None => continue,
                    },
                };
                if tx.blocking_send(item).is_err() {
                    break;
                }
            }
        });

        let mut files = Vec::new();
        while let Some(item) = rx.recv().await {
            match item {
                Ok(path) if self.is_video(&path) => files.push(MediaFile::from_path(path)),
                Ok(path) => debug!(path = %path.display(), "Skipping non-video file"),
                Err(path) => {
                    warn!(path = %path.display(), "Unreadable entry during scan");
                    files.push(MediaFile::unreadable(path));
                }
            }
        }

        walker
            .await
            .map_err(|e| FilesystemError::Io(format!("scan task failed: {e}")))?;

        Ok(files)
    }
}
