use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, UrlRequest};
use crate::api::validation::validate_source_url;
use crate::clients::{ExternalSourceError, ScrapeResult};
use crate::services::{ImportError, ImportedAnime};

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Validation(msg) => Self::validation(msg),
            ImportError::Fetch(ExternalSourceError::InvalidUrl(url)) => {
                Self::validation(format!("Invalid URL: '{url}'"))
            }
            ImportError::Fetch(err) => Self::external_source(err.to_string()),
            ImportError::Create(err) => err.into(),
        }
    }
}

/// `POST /api/import/scrape`
///
/// Parses the detail page and returns it without touching the catalog.
pub async fn scrape_preview(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<ApiResponse<ScrapeResult>>, ApiError> {
    let url = validate_source_url(&request.url)?;
    let scraped = state.import_service().preview(url).await?;
    Ok(Json(ApiResponse::success(scraped)))
}

/// `POST /api/import`
///
/// Succeeds as soon as the anime exists. Episodes that could not be created
/// are listed in `warnings`.
pub async fn import_from_url(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<ApiResponse<ImportedAnime>>, ApiError> {
    let url = validate_source_url(&request.url)?;
    let imported = state.import_service().import_from_external(url).await?;
    Ok(Json(ApiResponse::success(imported)))
}
