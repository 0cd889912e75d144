use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SearchQuery};
use crate::api::validation::validate_search_query;
use crate::services::{CombinedSearchResponse, ExternalSearchResult, SearchError};

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(msg) => Self::validation(msg),
            SearchError::Storage(err) => err.into(),
            SearchError::External(err) => Self::external_source(err.to_string()),
        }
    }
}

/// `GET /api/search/combined?q=`
///
/// Never fails because of the external source; a failure there shows up as
/// `external_error` next to the local results.
pub async fn combined_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<CombinedSearchResponse>>, ApiError> {
    let query = validate_search_query(&params.q)?;
    let response = state.search_service().combined_search(query).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// `GET /api/search/external?q=`
pub async fn external_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<ExternalSearchResult>>>, ApiError> {
    let query = validate_search_query(&params.q)?;
    let results = state.search_service().external_search(query).await?;
    Ok(Json(ApiResponse::success(results)))
}
