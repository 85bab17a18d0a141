//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::index::Indexer;
use crate::reindex::Reindexer;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Reindex trigger (owns the message source)
    pub reindexer: Arc<Reindexer>,
    /// Search index answering queries
    pub indexer: Arc<Indexer>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(reindexer: Arc<Reindexer>, config: ApiConfig) -> Self {
        Self {
            indexer: Arc::clone(reindexer.indexer()),
            reindexer,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Default page size for /search
    #[serde(default = "default_search_size")]
    pub default_search_size: usize,
    /// Upper bound on page size for /search
    #[serde(default = "default_max_search_size")]
    pub max_search_size: usize,
    /// Default page size for /messages
    #[serde(default = "default_list_size")]
    pub default_list_size: usize,
    /// Upper bound on page size for /messages
    #[serde(default = "default_max_list_size")]
    pub max_list_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_search_size() -> usize {
    10
}

fn default_max_search_size() -> usize {
    100
}

fn default_list_size() -> usize {
    100
}

fn default_max_list_size() -> usize {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_search_size: default_search_size(),
            max_search_size: default_max_search_size(),
            default_list_size: default_list_size(),
            max_list_size: default_max_list_size(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
