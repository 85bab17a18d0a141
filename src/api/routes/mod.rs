//! API Routes
//!
//! Route handlers organized by functionality.

pub mod health;
pub mod messages;
pub mod reindex;
pub mod search;
