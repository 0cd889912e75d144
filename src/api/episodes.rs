use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, PageQuery, WatchStatusRequest};
use crate::api::validation::{validate_anime_id, validate_episode_id};
use crate::domain::SignalPatch;
use crate::models::{Episode, EpisodePatch, NewEpisode};
use crate::services::Page;

/// `GET /api/anime/{id}/episodes`, ordered by episode number.
pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(params): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Episode>>>, ApiError> {
    let anime_id = validate_anime_id(id)?;
    let page = Page::new(params.skip, params.limit)?;
    let episodes = state.catalog().list_episodes(anime_id, page).await?;
    Ok(Json(ApiResponse::success(episodes)))
}

pub async fn create_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<NewEpisode>,
) -> Result<Json<ApiResponse<Episode>>, ApiError> {
    let anime_id = validate_anime_id(id)?;
    let episode = state.catalog().create_episode(anime_id, input).await?;
    Ok(Json(ApiResponse::success(episode)))
}

pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Episode>>, ApiError> {
    let episode_id = validate_episode_id(id)?;
    let episode = state.catalog().get_episode(episode_id).await?;
    Ok(Json(ApiResponse::success(episode)))
}

/// `PUT /api/episodes/{id}`
///
/// Signals missing from the body keep their stored value; the availability
/// state is always recomputed from both.
pub async fn update_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(patch): Json<EpisodePatch>,
) -> Result<Json<ApiResponse<Episode>>, ApiError> {
    let episode_id = validate_episode_id(id)?;
    let episode = state.catalog().update_episode(episode_id, patch).await?;
    Ok(Json(ApiResponse::success(episode)))
}

pub async fn update_episode_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<WatchStatusRequest>,
) -> Result<Json<ApiResponse<Episode>>, ApiError> {
    let episode_id = validate_episode_id(id)?;
    let episode = state
        .catalog()
        .update_episode_status(episode_id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(episode)))
}

/// `PATCH /api/episodes/{id}/availability`
///
/// Body: `{ "owned_locally"?: bool, "available_online"?: bool }`, at least one.
pub async fn update_episode_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(signals): Json<SignalPatch>,
) -> Result<Json<ApiResponse<Episode>>, ApiError> {
    let episode_id = validate_episode_id(id)?;
    let episode = state
        .catalog()
        .update_episode_availability(episode_id, signals)
        .await?;
    Ok(Json(ApiResponse::success(episode)))
}

pub async fn delete_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let episode_id = validate_episode_id(id)?;
    state.catalog().delete_episode(episode_id).await?;
    Ok(Json(ApiResponse::success(())))
}
