//! Reindexer
//!
//! Fetches the full message collection and publishes a fresh index built
//! from it. Triggered once at startup, on demand through the API, and
//! optionally on a fixed interval.
//!
//! A failed fetch never touches the published index: a server whose first
//! reindex fails stays NOT_READY and answers every query with an empty page.

use crate::fetcher::{FetchError, MessageSource};
use crate::index::Indexer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Couples a message source with the indexer it feeds
pub struct Reindexer {
    source: Arc<dyn MessageSource>,
    indexer: Arc<Indexer>,
    last_status: RwLock<Option<ReindexStatus>>,
    /// Serializes triggers so two fetch+build cycles never overlap
    in_flight: Mutex<()>,
}

/// Status of a reindex attempt
#[derive(Debug, Clone, Serialize)]
pub struct ReindexStatus {
    /// When the attempt finished
    pub finished_at: DateTime<Utc>,
    /// Messages indexed (0 on failure)
    pub count: usize,
    /// Fetch + build time
    pub duration_ms: u64,
    /// Whether it succeeded
    pub success: bool,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReindexStatus {
    fn succeeded(count: usize, elapsed: Duration) -> Self {
        Self {
            finished_at: Utc::now(),
            count,
            duration_ms: elapsed.as_millis() as u64,
            success: true,
            error: None,
        }
    }

    fn failed(err: &FetchError, elapsed: Duration) -> Self {
        Self {
            finished_at: Utc::now(),
            count: 0,
            duration_ms: elapsed.as_millis() as u64,
            success: false,
            error: Some(err.to_string()),
        }
    }
}

impl Reindexer {
    pub fn new(source: Arc<dyn MessageSource>, indexer: Arc<Indexer>) -> Self {
        Self {
            source,
            indexer,
            last_status: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    /// The indexer this reindexer publishes to
    pub fn indexer(&self) -> &Arc<Indexer> {
        &self.indexer
    }

    /// Fetch everything and rebuild the index.
    ///
    /// Returns the number of messages indexed. On failure the previous index
    /// stays published and the error is returned to the caller.
    pub async fn reindex(&self) -> Result<ReindexStatus, FetchError> {
        let _guard = self.in_flight.lock().await;
        let start = Instant::now();

        tracing::debug!("Fetching messages for reindex");
        match self.source.fetch_messages().await {
            Ok(messages) => {
                let stats = self.indexer.build(messages);
                let status = ReindexStatus::succeeded(stats.message_count, start.elapsed());

                tracing::info!(
                    count = status.count,
                    duration_ms = status.duration_ms,
                    "Reindex completed"
                );
                *self.last_status.write().await = Some(status.clone());
                Ok(status)
            }
            Err(err) => {
                let status = ReindexStatus::failed(&err, start.elapsed());

                tracing::error!(
                    error = %err,
                    duration_ms = status.duration_ms,
                    ready = self.indexer.is_ready(),
                    "Reindex failed, keeping previous index"
                );
                *self.last_status.write().await = Some(status);
                Err(err)
            }
        }
    }

    /// Outcome of the most recent attempt, if any
    pub async fn last_status(&self) -> Option<ReindexStatus> {
        self.last_status.read().await.clone()
    }

    /// Start a periodic reindex task.
    ///
    /// Returns `None` when `every` is zero. The first tick fires one full
    /// interval after the call, since startup already reindexed.
    pub fn start_background_reindex(
        self: Arc<Self>,
        every: Duration,
    ) -> Option<tokio::task::JoinHandle<()>> {
        if every.is_zero() {
            tracing::info!("Periodic reindex disabled");
            return None;
        }

        tracing::info!(interval_secs = every.as_secs(), "Starting periodic reindex");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;

                tracing::debug!("Running scheduled reindex");
                // Failures are already logged and recorded by reindex()
                let _ = self.reindex().await;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchResult, Message};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that replays scripted results, then keeps returning the last one
    struct ScriptedSource {
        script: std::sync::Mutex<VecDeque<Result<usize, u16>>>,
        calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<usize, u16>>) -> Self {
            Self {
                script: std::sync::Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    fn messages(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| Message::new(i.to_string(), "u", "Alice", "t", format!("hello {}", i)))
            .collect()
    }

    #[async_trait]
    impl MessageSource for ScriptedSource {
        async fn fetch_messages(&self) -> FetchResult<Vec<Message>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let next = {
                let mut script = self.script.lock().unwrap();
                if script.len() > 1 {
                    script.pop_front()
                } else {
                    script.front().cloned()
                }
            };
            self.active.fetch_sub(1, Ordering::SeqCst);

            match next.unwrap_or(Ok(0)) {
                Ok(count) => Ok(messages(count)),
                Err(status) => Err(FetchError::Status {
                    status,
                    body: "upstream down".to_string(),
                }),
            }
        }
    }

    fn reindexer(source: ScriptedSource) -> (Arc<Reindexer>, Arc<ScriptedSource>) {
        let source = Arc::new(source);
        let reindexer = Arc::new(Reindexer::new(
            Arc::clone(&source) as Arc<dyn MessageSource>,
            Arc::new(Indexer::new()),
        ));
        (reindexer, source)
    }

    #[tokio::test]
    async fn test_reindex_builds_index() {
        let (reindexer, _) = reindexer(ScriptedSource::new(vec![Ok(3)]));

        let status = reindexer.reindex().await.unwrap();

        assert!(status.success);
        assert_eq!(status.count, 3);
        assert!(reindexer.indexer().is_ready());
        assert_eq!(reindexer.indexer().search("hello", 1, 10).total, 3);
        assert!(reindexer.last_status().await.unwrap().success);
    }

    #[tokio::test]
    async fn test_failed_startup_leaves_index_not_ready() {
        let (reindexer, _) = reindexer(ScriptedSource::new(vec![Err(503)]));

        let err = reindexer.reindex().await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert!(!reindexer.indexer().is_ready());
        assert_eq!(reindexer.indexer().search("hello", 1, 10).total, 0);

        let last = reindexer.last_status().await.unwrap();
        assert!(!last.success);
        assert_eq!(last.error.as_deref(), Some("Upstream returned 503: upstream down"));
    }

    #[tokio::test]
    async fn test_failed_reindex_keeps_previous_index() {
        let (reindexer, _) = reindexer(ScriptedSource::new(vec![Ok(4), Err(500)]));

        reindexer.reindex().await.unwrap();
        assert!(reindexer.reindex().await.is_err());

        let stats = reindexer.indexer().stats();
        assert!(stats.ready);
        assert_eq!(stats.message_count, 4);
        assert_eq!(stats.generation, 1);
    }

    #[tokio::test]
    async fn test_concurrent_triggers_are_serialized() {
        let (reindexer, source) =
            reindexer(ScriptedSource::new(vec![Ok(2)]).with_delay(Duration::from_millis(20)));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let reindexer = Arc::clone(&reindexer);
                tokio::spawn(async move { reindexer.reindex().await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        assert_eq!(source.max_active.load(Ordering::SeqCst), 1);
        assert_eq!(reindexer.indexer().stats().generation, 4);
    }

    #[tokio::test]
    async fn test_background_reindex_disabled_for_zero_interval() {
        let (reindexer, _) = reindexer(ScriptedSource::new(vec![Ok(1)]));
        assert!(reindexer.start_background_reindex(Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn test_background_reindex_runs() {
        let (reindexer, source) = reindexer(ScriptedSource::new(vec![Ok(2)]));

        let handle = Arc::clone(&reindexer)
            .start_background_reindex(Duration::from_millis(10))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(source.calls.load(Ordering::SeqCst) >= 1);
        assert!(reindexer.indexer().is_ready());
    }
}
