//! Fetcher error types

use thiserror::Error;

/// Errors that can occur while fetching from the upstream source
#[derive(Error, Debug)]
pub enum FetchError {
    /// Upstream rejected the request shape (HTTP 422). Never retried.
    #[error("Upstream validation error 422: {body}")]
    Validation { body: String },

    /// Any other non-success HTTP status
    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Request did not complete within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Network-level failure (connect, reset, TLS, ...)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body was not a valid listing
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    /// Redirect chain exceeded the hop bound
    #[error("Too many redirects ({hops}), last location {location}")]
    TooManyRedirects { hops: u32, location: String },

    /// Base URL or redirect location could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Retry budget exhausted; carries the last underlying cause
    #[error("Failed to fetch messages after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether the failure is transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Status { .. } | FetchError::Timeout | FetchError::Request(_)
        )
    }

    /// Whether the failure suggests the page-size parameter itself was
    /// rejected, so a parameterless request may still succeed.
    ///
    /// 429 never qualifies: "rate limit" bodies mention "limit" too.
    pub fn is_limit_rejection(&self) -> bool {
        match self {
            FetchError::Validation { .. } => true,
            FetchError::Status { status: 429, .. } => false,
            FetchError::Status { status, body } => {
                *status == 400 || body.to_lowercase().contains("limit")
            }
            FetchError::Exhausted { last, .. } => last.is_limit_rejection(),
            _ => false,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(err)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
