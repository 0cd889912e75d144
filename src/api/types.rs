use serde::{Deserialize, Serialize};

use crate::domain::{AnimeStatus, WatchStatus};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnimeListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// `all`, `online`, `local` or `available`.
    pub availability: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    /// Falls back to `library.media_root`.
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnimeStatusRequest {
    pub status: AnimeStatus,
}

#[derive(Debug, Deserialize)]
pub struct WatchStatusRequest {
    pub status: WatchStatus,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: bool,
}
