//! Search Index Snapshot
//!
//! An immutable view of one indexed collection. Built in a single pass that
//! lowercases both searchable fields of every message, so queries never
//! lowercase message text again.
//!
//! ```text
//! messages:   [ m0,              m1,               m2             ]
//! projection: [ (body0, name0),  (body1, name1),   (body2, name2) ]   (lowercased)
//! ```
//!
//! Both vectors are built together and never mutated, so element `i` of
//! each always describes the same message.

use crate::fetcher::Message;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::Range;
use std::time::Instant;

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Number of items across all pages
    pub total: usize,
    /// Items on the requested page
    pub items: Vec<T>,
    /// Requested page (1-indexed), echoed back
    pub page: usize,
    /// Requested page size, echoed back
    pub size: usize,
    /// ceil(total / size), 0 when nothing matched
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Empty result echoing the requested page and size
    pub fn empty(page: usize, size: usize) -> Self {
        Self {
            total: 0,
            items: Vec::new(),
            page,
            size,
            total_pages: 0,
        }
    }

    pub fn total_pages(total: usize, size: usize) -> usize {
        if total == 0 || size == 0 {
            0
        } else {
            total.div_ceil(size)
        }
    }
}

/// Index range covered by a 1-indexed page
fn window(page: usize, size: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(size);
    start..start.saturating_add(size)
}

/// Lowercased searchable fields of one message
#[derive(Debug, Clone)]
struct Projection {
    body: String,
    author: String,
}

impl Projection {
    fn of(message: &Message) -> Self {
        Self {
            body: message.message.to_lowercase(),
            author: message.user_name.to_lowercase(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.body.contains(needle) || self.author.contains(needle)
    }
}

/// Immutable, fully built search state
#[derive(Debug, Default)]
pub struct SearchIndex {
    messages: Vec<Message>,
    projection: Vec<Projection>,
    ready: bool,
    pub(crate) generation: u64,
    built_at: Option<DateTime<Utc>>,
    build_duration_ms: f64,
}

impl SearchIndex {
    /// The NOT_READY state: nothing indexed yet
    pub fn not_ready() -> Self {
        Self::default()
    }

    /// Build a ready index over `messages`, preserving their order.
    pub fn build(messages: Vec<Message>) -> Self {
        let start = Instant::now();
        let projection = messages.iter().map(Projection::of).collect();

        Self {
            messages,
            projection,
            ready: true,
            generation: 0,
            built_at: Some(Utc::now()),
            build_duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Indexed messages in upstream order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Successful builds published before this one, plus one
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    pub fn build_duration_ms(&self) -> f64 {
        self.build_duration_ms
    }

    /// Case-insensitive substring search over body and author name.
    ///
    /// Unranked: matches come back in collection order. Only the requested
    /// page is cloned; the rest of the matches are just counted.
    pub fn search(&self, query: &str, page: usize, size: usize) -> Page<Message> {
        if !self.ready || self.messages.is_empty() {
            return Page::empty(page, size);
        }

        let needle = query.trim().to_lowercase();
        let range = window(page, size);
        let mut total = 0;
        let mut items = Vec::new();

        for (message, projection) in self.messages.iter().zip(&self.projection) {
            if projection.matches(&needle) {
                if range.contains(&total) {
                    items.push(message.clone());
                }
                total += 1;
            }
        }

        Page {
            total,
            items,
            page,
            size,
            total_pages: Page::<Message>::total_pages(total, size),
        }
    }

    /// Browse the whole collection in order.
    pub fn list(&self, page: usize, size: usize) -> Page<Message> {
        if !self.ready || self.messages.is_empty() {
            return Page::empty(page, size);
        }

        let total = self.messages.len();
        let range = window(page, size);
        let start = range.start.min(total);
        let end = range.end.min(total);

        Page {
            total,
            items: self.messages[start..end].to_vec(),
            page,
            size,
            total_pages: Page::<Message>::total_pages(total, size),
        }
    }
}
