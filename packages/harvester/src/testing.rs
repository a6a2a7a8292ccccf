//! In-memory fetcher for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};
use crate::fetch::PageFetcher;

enum Response {
    Page(String),
    Timeout,
    Failure(u16),
    /// Fails with a 500 for the first N calls, then serves the page.
    Flaky { body: String, fail_first: usize },
}

/// Scripted [`PageFetcher`] that records every call per URL.
///
/// Unknown URLs answer with a 404 status error.
pub struct MockFetcher {
    responses: HashMap<String, Response>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .insert(url.into(), Response::Page(body.into()));
        self
    }

    pub fn with_timeout(mut self, url: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Response::Timeout);
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Response::Failure(status));
        self
    }

    pub fn with_flaky_page(
        mut self,
        url: impl Into<String>,
        body: impl Into<String>,
        fail_first: usize,
    ) -> Self {
        self.responses.insert(
            url.into(),
            Response::Flaky {
                body: body.into(),
                fail_first,
            },
        );
        self
    }

    /// How many times `url` has been requested so far.
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn get(&self, url: &str) -> FetchResult<String> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        match self.responses.get(url) {
            Some(Response::Page(body)) => Ok(body.clone()),
            Some(Response::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            Some(Response::Failure(status)) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
            Some(Response::Flaky { body, fail_first }) => {
                if call_number <= *fail_first {
                    Err(FetchError::Status {
                        status: 500,
                        url: url.to_string(),
                    })
                } else {
                    Ok(body.clone())
                }
            }
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
