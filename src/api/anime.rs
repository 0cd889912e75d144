use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{AnimeListParams, AnimeStatusRequest, ApiError, ApiResponse, AppState, SearchQuery};
use crate::api::validation::{validate_anime_id, validate_search_query};
use crate::domain::{AnimeStatus, AvailabilityFilter};
use crate::models::{Anime, AnimePatch, NewAnime};
use crate::services::{AnimeDetail, AnimeListQuery, AnimePage, CatalogError, Page};

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => Self::validation(msg),
            CatalogError::AnimeNotFound(id) => Self::anime_not_found(id),
            CatalogError::EpisodeNotFound(id) => Self::episode_not_found(id),
            CatalogError::Conflict(msg) => Self::conflict(msg),
            CatalogError::Storage(err) => err.into(),
        }
    }
}

/// `GET /api/anime`
///
/// Supports `skip`, `limit`, `availability` and `status`. Each item carries
/// its availability summary.
pub async fn list_anime(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnimeListParams>,
) -> Result<Json<ApiResponse<AnimePage>>, ApiError> {
    let availability = params
        .availability
        .as_deref()
        .map(str::parse::<AvailabilityFilter>)
        .transpose()
        .map_err(|e| ApiError::validation(e.to_string()))?
        .unwrap_or_default();
    let status = params
        .status
        .as_deref()
        .map(str::parse::<AnimeStatus>)
        .transpose()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let query = AnimeListQuery {
        page: Page::new(params.skip, params.limit)?,
        availability,
        status,
    };

    let page = state.catalog().list_anime(query).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// `GET /api/anime/search?q=`
pub async fn search_anime(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Anime>>>, ApiError> {
    let query = validate_search_query(&params.q)?;
    let results = state.catalog().search_anime(query).await?;
    Ok(Json(ApiResponse::success(results)))
}

pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AnimeDetail>>, ApiError> {
    let anime_id = validate_anime_id(id)?;
    let detail = state.catalog().get_anime(anime_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

pub async fn create_anime(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewAnime>,
) -> Result<Json<ApiResponse<Anime>>, ApiError> {
    let anime = state.catalog().create_anime(input).await?;
    tracing::info!(anime_id = anime.id.value(), title = %anime.title, "Anime created");
    Ok(Json(ApiResponse::success(anime)))
}

pub async fn update_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(patch): Json<AnimePatch>,
) -> Result<Json<ApiResponse<Anime>>, ApiError> {
    let anime_id = validate_anime_id(id)?;
    let anime = state.catalog().update_anime(anime_id, patch).await?;
    Ok(Json(ApiResponse::success(anime)))
}

pub async fn update_anime_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<AnimeStatusRequest>,
) -> Result<Json<ApiResponse<Anime>>, ApiError> {
    let anime_id = validate_anime_id(id)?;
    let anime = state
        .catalog()
        .update_anime_status(anime_id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(anime)))
}

pub async fn delete_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let anime_id = validate_anime_id(id)?;
    state.catalog().delete_anime(anime_id).await?;
    Ok(Json(ApiResponse::success(())))
}
