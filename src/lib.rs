//! # Aurora
//!
//! In-memory message search engine fed by a resilient upstream fetch
//! pipeline.
//!
//! ## Features
//!
//! - **Resilient fetch**: manual redirect following with https upgrade,
//!   linear-backoff retries, page-size fallback for picky upstreams
//! - **Fast search**: lowercase projection computed once per build, so a
//!   query is a single in-order scan
//! - **Consistent rebuilds**: new index built off to the side and published
//!   with one pointer swap
//! - **Latency budget**: every search is graded against 100 ms / 30 ms
//!
//! ## Modules
//!
//! - [`fetcher`]: Upstream HTTP client and retry policy
//! - [`index`]: Search index snapshot and its owner
//! - [`reindex`]: Fetch + rebuild trigger
//! - [`latency`]: Response time thresholds and statistics
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aurora::fetcher::{FetcherConfig, MessageFetcher};
//! use aurora::index::Indexer;
//! use aurora::reindex::Reindexer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Arc::new(MessageFetcher::new(FetcherConfig::default())?);
//!     let indexer = Arc::new(Indexer::new());
//!     let reindexer = Reindexer::new(fetcher, Arc::clone(&indexer));
//!
//!     let status = reindexer.reindex().await?;
//!     println!("Indexed {} messages", status.count);
//!
//!     let page = indexer.search("paris", 1, 10);
//!     for message in &page.items {
//!         println!("{}: {}", message.user_name, message.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod fetcher;
pub mod index;
pub mod latency;
pub mod reindex;

// Re-export top-level types for convenience
pub use fetcher::{
    FetchError, FetchResult, FetcherConfig, Message, MessageFetcher, MessageSource, MessagesPage,
    RetryPolicy,
};

pub use index::{IndexStats, Indexer, Page, SearchIndex};

pub use reindex::{ReindexStatus, Reindexer};

pub use latency::{LatencyGrade, LatencySummary};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, IndexConfig, LoggingConfig};
