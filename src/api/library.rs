use axum::{Json, extract::State};
use std::path::PathBuf;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ScanRequest};
use crate::services::{ScanError, ScanSummary};

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Validation(msg) => Self::validation(msg),
            ScanError::Filesystem(err) => err.into(),
            ScanError::Storage(err) => err.into(),
        }
    }
}

async fn run_scan(
    state: &AppState,
    request: Option<ScanRequest>,
    create_missing: bool,
) -> Result<ScanSummary, ApiError> {
    let path = match request.and_then(|r| r.path).filter(|p| !p.trim().is_empty()) {
        Some(path) => PathBuf::from(path.trim()),
        None => PathBuf::from(state.config().read().await.library.media_root.clone()),
    };

    Ok(state
        .reconciliation()
        .scan_and_reconcile(&path, create_missing)
        .await?)
}

/// `POST /api/library/scan`
///
/// Marks matching episodes as owned. Files for unknown anime are only reported.
pub async fn scan_library(
    State(state): State<Arc<AppState>>,
    request: Option<Json<ScanRequest>>,
) -> Result<Json<ApiResponse<ScanSummary>>, ApiError> {
    let summary = run_scan(&state, request.map(|Json(r)| r), false).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// `POST /api/library/scan-and-create`
///
/// Like [`scan_library`], but creates an anime for every unknown title.
pub async fn scan_and_create(
    State(state): State<Arc<AppState>>,
    request: Option<Json<ScanRequest>>,
) -> Result<Json<ApiResponse<ScanSummary>>, ApiError> {
    let summary = run_scan(&state, request.map(|Json(r)| r), true).await?;
    Ok(Json(ApiResponse::success(summary)))
}
