//! Search Routes
//!
//! - GET /search?query=...&page=1&size=10 - Substring search over message
//!   body and author name, annotated with response timing

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::dto::{resolve_pagination, SearchParams, SearchResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::latency::LatencyGrade;

/// GET /search
pub async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let request_start = Instant::now();

    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;

    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("Query parameter is required".to_string()))?;

    let (page, size) = resolve_pagination(
        params.page,
        params.size,
        state.config.default_search_size,
        state.config.max_search_size,
    )?;

    let search_start = Instant::now();
    let results = state.indexer.search(query, page, size);
    let search_time_ms = millis(search_start.elapsed());

    let total_time_ms = millis(request_start.elapsed());
    let grade = LatencyGrade::from_millis(total_time_ms);

    tracing::debug!(
        query,
        page,
        size,
        total = results.total,
        search_time_ms,
        "Search served"
    );

    Ok(Json(SearchResponse {
        total: results.total,
        items: results.items,
        page: results.page,
        size: results.size,
        total_pages: results.total_pages,
        search_time_ms: round3(search_time_ms),
        total_time_ms: round3(total_time_ms),
        meets_requirement: grade.meets_requirement(),
        meets_bonus_target: grade.meets_target(),
        performance_note: grade.note(),
    }))
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

fn round3(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}
