//! Bulk occupation harvesting library
//!
//! Discovers every occupation listed on an O*NET-style careers site,
//! scrapes each occupation's summary page into a structured record,
//! and persists the merged dataset as CSV and JSON. Built for long
//! unattended runs against a rate-limited site: polite delays between
//! requests, retry with backoff, periodic crash-recovery checkpoints,
//! and graceful cancellation with a partial-result save.
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::{
//!     HarvestConfig, Harvester, HttpFetcher, JsonCheckpointStore, MergePolicy,
//! };
//!
//! let config = HarvestConfig::default();
//! let fetcher = HttpFetcher::new(&config);
//! let checkpoints = JsonCheckpointStore::new("output/checkpoints");
//! let mut harvester = Harvester::new(fetcher, checkpoints, config);
//!
//! let outcome = harvester
//!     .run(Vec::new(), "output".as_ref(), MergePolicy::PreferNew)
//!     .await?;
//! println!("scraped {} occupations", outcome.stats.scraped);
//! ```
//!
//! # Modules
//!
//! - [`config`] - Run configuration, occupation families, extraction vocabulary
//! - [`fetch`] - `PageFetcher` trait, HTTP implementation, retry policy
//! - [`discovery`] - Catalog discovery across category listing pages
//! - [`extract`] - Heuristic field extraction from summary pages
//! - [`pipeline`] - The end-to-end `Harvester` run
//! - [`checkpoint`] - Periodic crash-recovery snapshots
//! - [`merge`] - Dataset merging with explicit precedence
//! - [`export`] - Final CSV/JSON persistence
//! - [`testing`] - Mock fetcher for tests

pub mod checkpoint;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod merge;
pub mod pipeline;
pub mod progress;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use checkpoint::{CheckpointStore, JsonCheckpointStore};
pub use config::{HarvestConfig, Vocabulary, OCCUPATION_FAMILIES};
pub use error::{FetchError, HarvestError};
pub use export::SavedDataset;
pub use fetch::{HttpFetcher, PageFetcher};
pub use merge::{load_saved_records, MergePolicy};
pub use pipeline::{HarvestOutcome, Harvester};
pub use types::{CatalogEntry, HarvestStats, OccupationRecord};
