use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthStatus};

/// `GET /api/health`
///
/// Always answers 200; `database` tells whether the store responded.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthStatus>> {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(ApiResponse::success(HealthStatus {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database,
    }))
}
