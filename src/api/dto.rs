//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::api::error::{ApiError, ApiResult};
use crate::fetcher::Message;
use crate::index::{IndexStats, Page};
use crate::reindex::ReindexStatus;
use serde::{Deserialize, Serialize};

// ============================================
// QUERY PARAMETERS
// ============================================

/// GET /search parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query, required and non-blank
    #[serde(default)]
    pub query: Option<String>,
    /// Page number (1-indexed)
    #[serde(default)]
    pub page: Option<usize>,
    /// Results per page
    #[serde(default)]
    pub size: Option<usize>,
}

/// GET /messages parameters
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    #[serde(default)]
    pub page: Option<usize>,
    /// Results per page
    #[serde(default)]
    pub size: Option<usize>,
}

/// Apply defaults and bounds to caller-supplied pagination.
///
/// page ≥ 1, 1 ≤ size ≤ `max_size`.
pub fn resolve_pagination(
    page: Option<usize>,
    size: Option<usize>,
    default_size: usize,
    max_size: usize,
) -> ApiResult<(usize, usize)> {
    let page = page.unwrap_or(1);
    let size = size.unwrap_or(default_size);

    if page < 1 {
        return Err(ApiError::Validation("page must be >= 1".to_string()));
    }
    if size < 1 || size > max_size {
        return Err(ApiError::Validation(format!(
            "size must be between 1 and {}",
            max_size
        )));
    }

    Ok((page, size))
}

// ============================================
// RESPONSES
// ============================================

/// GET / response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: String,
    pub service: String,
}

/// GET /search response: the page plus timing annotations
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub items: Vec<Message>,
    pub page: usize,
    pub size: usize,
    pub total_pages: usize,
    /// Time spent in the index lookup only
    pub search_time_ms: f64,
    /// Time from handler entry to response assembly
    pub total_time_ms: f64,
    /// total_time_ms < 100
    pub meets_requirement: bool,
    /// total_time_ms < 30
    pub meets_bonus_target: bool,
    pub performance_note: String,
}

/// GET /messages response
pub type MessageListResponse = Page<Message>;

/// POST /reindex response
#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    /// Status: "success"
    pub status: String,
    /// e.g. "Indexed 3349 messages"
    pub message: String,
    /// Number of messages indexed
    pub count: usize,
    /// Fetch + build time
    pub duration_ms: u64,
}

/// GET /health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy (index ready) or degraded
    pub status: String,
    /// Published index statistics
    pub index: IndexStats,
    /// Most recent reindex attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reindex: Option<ReindexStatus>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
