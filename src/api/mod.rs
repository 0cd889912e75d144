use axum::{
    Router,
    http::HeaderValue,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{CatalogService, ImportService, ReconciliationService, SearchService};
use crate::state::SharedState;

mod anime;
mod episodes;
mod error;
mod import;
mod library;
mod search;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog
    }

    #[must_use]
    pub fn search_service(&self) -> &Arc<SearchService> {
        &self.shared.search_service
    }

    #[must_use]
    pub fn import_service(&self) -> &Arc<ImportService> {
        &self.shared.import_service
    }

    #[must_use]
    pub fn reconciliation(&self) -> &Arc<ReconciliationService> {
        &self.shared.reconciliation
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.is_empty() || cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router().with_state(state))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(system::health))
        .route("/anime", get(anime::list_anime).post(anime::create_anime))
        .route("/anime/search", get(anime::search_anime))
        .route(
            "/anime/{id}",
            get(anime::get_anime)
                .put(anime::update_anime)
                .delete(anime::delete_anime),
        )
        .route("/anime/{id}/status", patch(anime::update_anime_status))
        .route(
            "/anime/{id}/episodes",
            get(episodes::list_episodes).post(episodes::create_episode),
        )
        .route(
            "/episodes/{id}",
            get(episodes::get_episode)
                .put(episodes::update_episode)
                .delete(episodes::delete_episode),
        )
        .route("/episodes/{id}/status", patch(episodes::update_episode_status))
        .route(
            "/episodes/{id}/availability",
            patch(episodes::update_episode_availability),
        )
        .route("/search/combined", get(search::combined_search))
        .route("/search/external", get(search::external_search))
        .route("/import", post(import::import_from_url))
        .route("/import/scrape", post(import::scrape_preview))
        .route("/library/scan", post(library::scan_library))
        .route("/library/scan-and-create", post(library::scan_and_create))
}
