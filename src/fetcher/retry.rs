//! Retry and redirect policy
//!
//! The fetch loop is driven by an explicit state machine instead of
//! error-driven control flow. Each request outcome is fed to
//! [`RetryPolicy`], which updates a [`RetryState`] and answers with the
//! next [`Step`]:
//!
//! ```text
//!   redirect + Location ──► hops < max_redirects ? Follow(url) : Fail(TooManyRedirects)
//!   422                 ──► Fail(Validation)
//!   decode / bad url    ──► Fail(err)
//!   other failure       ──► attempts < max_retries ? Retry(attempt × base_delay)
//!                                                  : Fail(Exhausted { last })
//! ```
//!
//! Redirects never consume a retry attempt; they are bounded by their own
//! hop counter.

use crate::fetcher::error::FetchError;
use reqwest::Url;
use std::time::Duration;

/// Redirect statuses that are followed manually
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Limits for one fetch call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up (not counting redirects)
    pub max_retries: u32,
    /// Delay unit; attempt `k` waits `k × base_delay`
    pub base_delay: Duration,
    /// Redirect hops followed before giving up
    pub max_redirects: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_redirects: 3,
        }
    }
}

/// Progress of one fetch call
#[derive(Debug, Default)]
pub struct RetryState {
    attempts: u32,
    redirects: u32,
    last_error: Option<String>,
}

/// What the fetch loop does next
#[derive(Debug)]
pub enum Step {
    /// Re-issue the request against this URL
    Follow(Url),
    /// Wait, then re-issue the request against the same URL
    Retry { attempt: u32, delay: Duration },
    /// Stop with this error
    Fail(FetchError),
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failed attempts so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Redirect hops followed so far
    pub fn redirects(&self) -> u32 {
        self.redirects
    }

    /// Display form of the most recent retryable failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl RetryPolicy {
    /// Transition on a redirect response.
    ///
    /// A missing `Location` is treated as an ordinary HTTP failure.
    pub fn on_redirect(
        &self,
        state: &mut RetryState,
        current: &Url,
        status: u16,
        location: Option<&str>,
    ) -> Step {
        let Some(location) = location else {
            return self.on_failure(
                state,
                FetchError::Status {
                    status,
                    body: "redirect without Location header".to_string(),
                },
            );
        };

        if state.redirects >= self.max_redirects {
            return Step::Fail(FetchError::TooManyRedirects {
                hops: state.redirects,
                location: location.to_string(),
            });
        }

        match resolve_location(current, location) {
            Ok(next) => {
                state.redirects += 1;
                Step::Follow(next)
            }
            Err(err) => Step::Fail(err),
        }
    }

    /// Transition on a failed attempt.
    pub fn on_failure(&self, state: &mut RetryState, err: FetchError) -> Step {
        if !err.is_retryable() {
            return Step::Fail(err);
        }

        state.attempts += 1;
        if state.attempts >= self.max_retries {
            return Step::Fail(FetchError::Exhausted {
                attempts: state.attempts,
                last: Box::new(err),
            });
        }

        state.last_error = Some(err.to_string());
        Step::Retry {
            attempt: state.attempts,
            delay: self.base_delay * state.attempts,
        }
    }
}

/// Resolve a `Location` header against the URL that produced it.
///
/// Absolute `http://` locations are upgraded to `https://`; relative ones
/// keep the current scheme.
pub fn resolve_location(current: &Url, location: &str) -> Result<Url, FetchError> {
    let location = match location.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => location.to_string(),
    };

    current
        .join(&location)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", location, e)))
}
