//! Message Listing Routes
//!
//! - GET /messages?page=1&size=100 - Browse the indexed collection in order

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{resolve_pagination, ListParams, MessageListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<MessageListResponse>> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;

    let (page, size) = resolve_pagination(
        params.page,
        params.size,
        state.config.default_list_size,
        state.config.max_list_size,
    )?;

    Ok(Json(state.indexer.list_all(page, size)))
}
