//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured identity and timeout
//! - Retrying transient failures with linearly increasing backoff
//! - Turning exhausted retries into a logged `None` instead of an error

use crate::config::HttpConfig;
use crate::url::request_target;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a single request attempt failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// One GET round-trip, without retries
///
/// `HttpTransport` is the production implementation; tests drive the retry
/// loop with scripted transports.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns the response body of a 2xx response
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        (**self).get(url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops) and the whole request is bounded
/// by `timeout_secs`.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Classifies a reqwest send error
fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// How many times to retry and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Wait before retry `k` is `k * backoff`
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay slept after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// Fetches pages with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Non-2xx status | Retry |
/// | Timeout | Retry |
/// | Connection error | Retry |
/// | Retries exhausted | Log the last cause, return `None` |
pub struct Fetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetches `url` (with `page` appended when given) and returns the body
    ///
    /// Never returns an error: after the last failed attempt the cause is
    /// logged and `None` is returned.
    pub async fn fetch_text(&self, url: &str, page: Option<u32>) -> Option<String> {
        self.fetch_outcome(url, page).await.ok()
    }

    /// Same retry loop as `fetch_text`, but hands back the final cause
    pub async fn fetch_outcome(&self, url: &str, page: Option<u32>) -> Result<String, FetchError> {
        let target = request_target(url, page);
        let attempts = self.policy.total_attempts();
        let mut attempt = 1;

        loop {
            match self.transport.get(&target).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt,
                        attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to fetch {}: {}", target, e);
                    return Err(e);
                }
            }
        }
    }

    /// Fetches and parses a page into a queryable document
    pub async fn fetch(&self, url: &str, page: Option<u32>) -> Option<Html> {
        self.fetch_text(url, page)
            .await
            .map(|body| Html::parse_document(&body))
    }
}
