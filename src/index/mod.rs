//! Aurora Search Index
//!
//! In-memory, atomically replaceable index over the fetched messages:
//!
//! - **SearchIndex**: immutable snapshot (messages + lowercase projection)
//! - **Indexer**: owns the current snapshot and publishes rebuilds
//!
//! # Query path
//!
//! ```text
//! search("Hello", page=2, size=10)
//!        ↓
//! Indexer: clone Arc of current snapshot (read lock held for the clone only)
//!        ↓
//! SearchIndex: trim + lowercase query once, scan projection in order,
//!              count every match, clone only matches in [10, 20)
//! ```

mod indexer;
mod snapshot;

pub use indexer::Indexer;
pub use snapshot::{Page, SearchIndex};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Statistics about the published index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    /// Whether any build has completed
    pub ready: bool,
    /// Number of indexed messages
    pub message_count: usize,
    /// Number of builds published so far
    pub generation: u64,
    /// When the current snapshot was built
    pub built_at: Option<DateTime<Utc>>,
    /// Time spent building the current snapshot
    pub build_duration_ms: f64,
}

impl IndexStats {
    pub fn of(index: &SearchIndex) -> Self {
        Self {
            ready: index.is_ready(),
            message_count: index.len(),
            generation: index.generation(),
            built_at: index.built_at(),
            build_duration_ms: index.build_duration_ms(),
        }
    }
}
