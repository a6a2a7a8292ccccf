//! Typed errors for the harvester library.
//!
//! Transient fetch failures are modelled
//! separately from run-level failures: a `FetchError` is retried and
//! eventually degrades to "item skipped", while a `HarvestError`
//! aborts the operation that raised it.

use thiserror::Error;

/// Errors that can occur during a harvest run.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// HTTP fetch failed after retries
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Discovery produced no occupation links at all
    #[error("no occupation links discovered")]
    EmptyCatalog,

    /// Base URL in the configuration is malformed
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// Checkpoint or export file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tabular export failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors from a single page fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request exceeded the configured timeout
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Connection-level request failure
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for single fetch attempts.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
