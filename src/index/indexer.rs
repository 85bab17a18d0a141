//! Indexer - owner of the current search snapshot
//!
//! Readers clone the `Arc` of the current [`SearchIndex`] under a read lock
//! and query it lock-free. A rebuild constructs the next snapshot entirely
//! outside the lock and takes the write lock only to publish it, so a reader
//! sees either the old state or the new one, never a mix.

use crate::fetcher::Message;
use crate::index::snapshot::{Page, SearchIndex};
use crate::index::IndexStats;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide search state
pub struct Indexer {
    current: RwLock<Arc<SearchIndex>>,
}

impl Default for Indexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Indexer {
    /// Create an indexer in the NOT_READY state
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(SearchIndex::not_ready())),
        }
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<SearchIndex> {
        // The guarded value is a single Arc, so a poisoned lock still holds
        // a consistent snapshot.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the indexed collection wholesale.
    ///
    /// Last writer wins when builds race.
    pub fn build(&self, messages: Vec<Message>) -> IndexStats {
        let mut next = SearchIndex::build(messages);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        next.generation = guard.generation() + 1;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        drop(guard);

        let stats = IndexStats::of(&next);
        tracing::info!(
            messages = stats.message_count,
            generation = stats.generation,
            build_ms = stats.build_duration_ms,
            "Search index rebuilt"
        );
        stats
    }

    /// Substring search against the current snapshot
    pub fn search(&self, query: &str, page: usize, size: usize) -> Page<Message> {
        self.snapshot().search(query, page, size)
    }

    /// Browse the current snapshot
    pub fn list_all(&self, page: usize, size: usize) -> Page<Message> {
        self.snapshot().list(page, size)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ready()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats::of(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn messages(prefix: &str, count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| {
                Message::new(
                    format!("{}-{}", prefix, i),
                    format!("u{}", i),
                    format!("{} author {}", prefix, i),
                    "2024-01-01T00:00:00Z",
                    format!("{} body {}", prefix, i),
                )
            })
            .collect()
    }

    #[test]
    fn test_starts_not_ready() {
        let indexer = Indexer::new();
        assert!(!indexer.is_ready());

        let stats = indexer.stats();
        assert!(!stats.ready);
        assert_eq!(stats.message_count, 0);
        assert_eq!(stats.generation, 0);
        assert!(stats.built_at.is_none());

        let page = indexer.search("anything", 2, 5);
        assert_eq!(page, Page::empty(2, 5));
    }

    #[test]
    fn test_build_makes_ready() {
        let indexer = Indexer::new();
        let stats = indexer.build(messages("old", 3));

        assert!(stats.ready);
        assert_eq!(stats.message_count, 3);
        assert_eq!(stats.generation, 1);
        assert!(indexer.is_ready());
        assert_eq!(indexer.list_all(1, 10).total, 3);
    }

    #[test]
    fn test_rebuild_replaces_wholesale() {
        let indexer = Indexer::new();
        indexer.build(messages("old", 5));
        let stats = indexer.build(messages("new", 2));

        assert_eq!(stats.generation, 2);
        assert_eq!(indexer.search("old", 1, 10).total, 0);
        assert_eq!(indexer.search("new", 1, 10).total, 2);
    }

    #[test]
    fn test_empty_build_stays_ready() {
        let indexer = Indexer::new();
        indexer.build(messages("old", 2));
        indexer.build(Vec::new());

        assert!(indexer.is_ready());
        assert_eq!(indexer.list_all(1, 10), Page::empty(1, 10));
    }

    #[test]
    fn test_build_is_idempotent() {
        let indexer = Indexer::new();
        indexer.build(messages("same", 7));
        let before: Vec<_> = (1..=4).map(|p| indexer.search("same 1", p, 2)).collect();

        indexer.build(messages("same", 7));
        let after: Vec<_> = (1..=4).map(|p| indexer.search("same 1", p, 2)).collect();

        assert_eq!(before, after);
    }

    #[test]
    fn test_held_snapshot_survives_rebuild() {
        let indexer = Indexer::new();
        indexer.build(messages("old", 4));

        let held = indexer.snapshot();
        indexer.build(messages("new", 1));

        assert_eq!(held.len(), 4);
        assert_eq!(held.search("old", 1, 10).total, 4);
        assert_eq!(indexer.snapshot().len(), 1);
    }

    #[test]
    fn test_concurrent_reads_never_see_mixed_state() {
        let indexer = Arc::new(Indexer::new());
        indexer.build(messages("a", 50));

        let writer = {
            let indexer = Arc::clone(&indexer);
            thread::spawn(move || {
                for round in 0..50 {
                    if round % 2 == 0 {
                        indexer.build(messages("b", 80));
                    } else {
                        indexer.build(messages("a", 50));
                    }
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let indexer = Arc::clone(&indexer);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let listing = indexer.list_all(1, 1000);
                        let a = listing.items.iter().filter(|m| m.id.starts_with("a-")).count();
                        let b = listing.items.iter().filter(|m| m.id.starts_with("b-")).count();
                        assert!(
                            (a == 50 && b == 0) || (a == 0 && b == 80),
                            "mixed snapshot: a={} b={}",
                            a,
                            b
                        );
                        assert_eq!(listing.total, listing.items.len());
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(indexer.stats().generation, 51);
    }
}
