//! Page fetching with retry and backoff.
//!
//! The `PageFetcher` trait is the seam between the pipeline and the
//! network, so tests can swap in a mock (see [`crate::testing`]).
//! `fetch_with_retry` owns the retry policy: timeouts back off by a
//! fixed delay, other failures exponentially, and a URL that is still
//! failing after the configured attempts yields `None` — the caller
//! skips that item and moves on.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::HarvestConfig;
use crate::error::{FetchError, FetchResult};

/// Fetches one page body. Implementations do a single attempt;
/// retrying is the caller's concern.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> FetchResult<String>;
}

/// HTTP fetcher with browser-like headers.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HarvestConfig) -> Self {
        let user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .parse()
                .unwrap(),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.5".parse().unwrap(),
        );
        headers.insert(reqwest::header::CONNECTION, "keep-alive".parse().unwrap());

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> FetchResult<String> {
        debug!(url = %url, "fetching page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Request {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Fetch a URL, retrying per the configured policy.
///
/// Returns `None` once retries are exhausted; never propagates the
/// underlying error. Total attempts never exceed
/// `config.max_attempts`.
pub async fn fetch_with_retry<F>(fetcher: &F, url: &str, config: &HarvestConfig) -> Option<String>
where
    F: PageFetcher + ?Sized,
{
    for attempt in 0..config.max_attempts {
        match fetcher.get(url).await {
            Ok(body) => return Some(body),
            Err(e @ FetchError::Timeout { .. }) => {
                warn!(url = %url, attempt = attempt + 1, error = %e, "request timed out");
                if attempt + 1 < config.max_attempts {
                    tokio::time::sleep(config.timeout_backoff()).await;
                }
            }
            Err(e) => {
                warn!(url = %url, attempt = attempt + 1, error = %e, "request failed");
                if attempt + 1 < config.max_attempts {
                    tokio::time::sleep(config.retry_backoff(attempt)).await;
                }
            }
        }
    }

    error!(url = %url, attempts = config.max_attempts, "unable to fetch page");
    None
}
