//! Upstream Fetcher
//!
//! Retrieves the full message collection from the upstream HTTP source.
//!
//! ## Architecture
//!
//! - **Client**: reqwest-based [`MessageFetcher`], one request at a time
//! - **Retry**: explicit state machine deciding follow / retry / fail
//! - **Types**: wire shapes of the upstream listing
//!
//! ## Failure handling
//!
//! 1. Redirects are followed manually (insecure locations upgraded to https),
//!    bounded by their own hop counter
//! 2. HTTP 422 fails immediately
//! 3. Other HTTP errors, timeouts and network errors retry with linear backoff
//! 4. A rejected bulk page size falls back to one parameterless request

mod client;
mod error;
mod retry;
mod types;

pub use client::{FetcherConfig, MessageFetcher, MessageSource};
pub use error::{FetchError, FetchResult};
pub use retry::{resolve_location, RetryPolicy, RetryState, Step, REDIRECT_STATUSES};
pub use types::{Message, MessagesPage};
