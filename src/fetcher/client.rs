//! Upstream Message Client
//!
//! HTTP client for the upstream `/messages/` listing. The upstream is known
//! to redirect, fail transiently, and honor pagination parameters only on
//! some deployments, so every call runs through the [`RetryPolicy`] state
//! machine with automatic redirects disabled.

use crate::fetcher::error::{FetchError, FetchResult};
use crate::fetcher::retry::{RetryPolicy, RetryState, Step, REDIRECT_STATUSES};
use crate::fetcher::types::{Message, MessagesPage};
use async_trait::async_trait;
use reqwest::{header::LOCATION, redirect, Client, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Anything that can produce the full message collection
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch the complete, ordered message collection
    async fn fetch_messages(&self) -> FetchResult<Vec<Message>>;
}

/// Configuration for the upstream client
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Upstream origin, e.g. "https://november7-730026606190.europe-west1.run.app"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Listing path; the trailing slash avoids a redirect on the upstream
    #[serde(default = "default_messages_path")]
    pub messages_path: String,

    /// Overall timeout per request in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per fetch call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff unit in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Redirect hops per fetch call
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Page size requested by the first bulk fetch
    #[serde(default = "default_bulk_limit")]
    pub bulk_limit: u64,

    /// Page size the upstream assumes when `limit` is omitted
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Fetch remaining pages when the stated total exceeds the first page
    #[serde(default = "default_follow_pages")]
    pub follow_pages: bool,
}

fn default_base_url() -> String {
    "https://november7-730026606190.europe-west1.run.app".to_string()
}

fn default_messages_path() -> String {
    "/messages/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_redirects() -> u32 {
    3
}

fn default_bulk_limit() -> u64 {
    1000
}

fn default_limit() -> u64 {
    100
}

fn default_follow_pages() -> bool {
    true
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            messages_path: default_messages_path(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_redirects: default_max_redirects(),
            bulk_limit: default_bulk_limit(),
            default_limit: default_limit(),
            follow_pages: default_follow_pages(),
        }
    }
}

impl FetcherConfig {
    /// Config pointing at a different upstream origin
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Full listing URL
    pub fn listing_url(&self) -> FetchResult<Url> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.messages_path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries.max(1),
            base_delay: Duration::from_millis(self.retry_delay_ms),
            max_redirects: self.max_redirects,
        }
    }
}

/// What one request produced, short of an error
enum Reply {
    Page(MessagesPage),
    Redirect { status: u16, location: Option<String> },
}

/// Resilient client for the upstream listing
pub struct MessageFetcher {
    client: Client,
    config: FetcherConfig,
    policy: RetryPolicy,
}

impl MessageFetcher {
    /// Create a new fetcher with the given configuration
    pub fn new(config: FetcherConfig) -> FetchResult<Self> {
        // Validate eagerly so a bad base URL fails at startup
        config.listing_url()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::none())
            .user_agent(concat!("aurora/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let policy = config.retry_policy();
        Ok(Self {
            client,
            config,
            policy,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Query parameters for a page request.
    ///
    /// Parameters equal to the upstream defaults are omitted, since some
    /// deployments reject parameters they do not expect.
    pub fn page_params(&self, offset: u64, limit: u64) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if offset > 0 {
            params.push(("offset", offset.to_string()));
        }
        if limit != self.config.default_limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }

    /// Fetch one page, following redirects and retrying transient failures.
    pub async fn fetch_page(&self, offset: u64, limit: u64) -> FetchResult<MessagesPage> {
        let params = self.page_params(offset, limit);
        let mut url = with_params(self.config.listing_url()?, &params);
        let mut state = RetryState::new();

        loop {
            let step = match self.send_once(&url).await {
                Ok(Reply::Page(page)) => {
                    tracing::debug!(
                        offset,
                        limit,
                        total = page.total,
                        items = page.items.len(),
                        "Fetched upstream page"
                    );
                    return Ok(page);
                }
                Ok(Reply::Redirect { status, location }) => {
                    self.policy
                        .on_redirect(&mut state, &url, status, location.as_deref())
                }
                Err(err) => self.policy.on_failure(&mut state, err),
            };

            match step {
                Step::Follow(next) => {
                    tracing::debug!(from = %url, to = %next, "Following upstream redirect");
                    url = with_params(next, &params);
                }
                Step::Retry { attempt, delay } => {
                    tracing::warn!(
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = state.last_error().unwrap_or_default(),
                        "Upstream fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Step::Fail(err) => return Err(err),
            }
        }
    }

    /// Fetch the full collection.
    ///
    /// Tries one large page first. If the upstream rejects the page-size
    /// parameter, falls back to a single parameterless request and returns
    /// whatever it yields. Any other failure propagates.
    pub async fn fetch_all(&self) -> FetchResult<Vec<Message>> {
        match self.fetch_page(0, self.config.bulk_limit).await {
            Ok(first) => self.collect_remaining(first).await,
            Err(err) if err.is_limit_rejection() => {
                tracing::warn!(
                    error = %err,
                    "Upstream rejected page size, fetching without pagination parameters"
                );
                let page = self.fetch_page(0, self.config.default_limit).await?;
                Ok(page.items)
            }
            Err(err) => Err(err),
        }
    }

    /// Follow pagination until the stated total is reached.
    ///
    /// Stops early on a page that contributes no unseen id, which is what an
    /// upstream ignoring `offset` looks like.
    async fn collect_remaining(&self, first: MessagesPage) -> FetchResult<Vec<Message>> {
        let total = first.total;
        let mut messages = first.items;

        if !self.config.follow_pages || messages.is_empty() {
            return Ok(messages);
        }

        let mut seen: HashSet<String> = messages.iter().map(|m| m.id.clone()).collect();

        while (messages.len() as u64) < total {
            let page = self
                .fetch_page(messages.len() as u64, self.config.bulk_limit)
                .await?;

            let before = messages.len();
            messages.extend(page.items.into_iter().filter(|m| seen.insert(m.id.clone())));

            if messages.len() == before {
                tracing::debug!(
                    collected = before,
                    total,
                    "Upstream page added no new messages, stopping pagination"
                );
                break;
            }
        }

        Ok(messages)
    }

    async fn send_once(&self, url: &Url) -> FetchResult<Reply> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();

        if REDIRECT_STATUSES.contains(&status.as_u16()) {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Ok(Reply::Redirect {
                status: status.as_u16(),
                location,
            });
        }

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Validation { body });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        let page: MessagesPage = serde_json::from_slice(&bytes)?;
        Ok(Reply::Page(page))
    }
}

/// Set each page parameter on `url` exactly once.
///
/// A redirect `Location` usually repeats the original query, so any key
/// already present is replaced rather than appended.
fn with_params(mut url: Url, params: &[(&'static str, String)]) -> Url {
    if params.is_empty() {
        return url;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| key == name))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(params.iter().map(|(name, value)| (*name, value.as_str())));
    url
}

#[async_trait]
impl MessageSource for MessageFetcher {
    async fn fetch_messages(&self) -> FetchResult<Vec<Message>> {
        self.fetch_all().await
    }
}
