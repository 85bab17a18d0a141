//! Health Routes
//!
//! - GET / - Service banner
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (index has been built)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, RootResponse};
use crate::api::state::AppState;

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        service: "Aurora Search Engine".to_string(),
    })
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once an index build has succeeded. Queries are still
/// answered before that, with empty results.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.indexer.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let index = state.indexer.stats();
    let status = if index.ready { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        index,
        last_reindex: state.reindexer.last_status().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
