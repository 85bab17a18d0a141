//! Reindex Routes
//!
//! - POST /reindex - Fetch everything from upstream and rebuild the index

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ReindexResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// POST /reindex
///
/// On failure the previous index keeps serving and the error surfaces as
/// a 500 with code `REINDEX_FAILED`.
pub async fn trigger_reindex(State(state): State<Arc<AppState>>) -> ApiResult<Json<ReindexResponse>> {
    tracing::info!("Manual reindex requested");

    let status = state.reindexer.reindex().await?;

    Ok(Json(ReindexResponse {
        status: "success".to_string(),
        message: format!("Indexed {} messages", status.count),
        count: status.count,
        duration_ms: status.duration_ms,
    }))
}
