//! The end-to-end harvest run.
//!
//! Linear control flow with a single mutable accumulator: discovery →
//! per-item fetch/extract loop (with periodic checkpoints and
//! progress reports) → merge with previously persisted data → final
//! save → checkpoint cleanup. Items are processed strictly in the
//! catalog's insertion order. Nothing that goes wrong with one item
//! can end the run: a fetch that exhausts its retries just increments
//! the failure counter and the loop moves on. Cancellation is an
//! expected exit path — an interrupted run still merges, saves and
//! reports whatever it collected.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::checkpoint::CheckpointStore;
use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::export::{log_dataset_overview, save_final, SavedDataset};
use crate::extract::Extractor;
use crate::fetch::{fetch_with_retry, PageFetcher};
use crate::merge::{merge_by_title, MergePolicy};
use crate::progress::ProgressReporter;
use crate::types::{CatalogEntry, HarvestStats, OccupationRecord};

/// Everything a finished run hands back to the caller.
#[derive(Debug)]
pub struct HarvestOutcome {
    /// Merged, deduplicated dataset as persisted
    pub records: Vec<OccupationRecord>,
    pub stats: HarvestStats,
    pub saved: SavedDataset,
}

/// Orchestrates one harvest run over injected fetcher and checkpoint
/// seams.
pub struct Harvester<F, C> {
    fetcher: F,
    checkpoints: C,
    extractor: Extractor,
    config: HarvestConfig,
    cancel: CancellationToken,
}

impl<F, C> Harvester<F, C>
where
    F: PageFetcher,
    C: CheckpointStore,
{
    pub fn new(fetcher: F, checkpoints: C, config: HarvestConfig) -> Self {
        let extractor = Extractor::new(config.vocabulary.clone());
        Self {
            fetcher,
            checkpoints,
            extractor,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token observed between items; cancel it to stop the run after
    /// the current item and still get a final save of partial results.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the full pipeline and persist the merged dataset to
    /// `output_dir`.
    pub async fn run(
        &mut self,
        existing: Vec<OccupationRecord>,
        output_dir: &Path,
        policy: MergePolicy,
    ) -> Result<HarvestOutcome> {
        let catalog = crate::discovery::discover_catalog(&self.fetcher, &self.config).await?;
        if catalog.is_empty() {
            return Err(HarvestError::EmptyCatalog);
        }

        let total = catalog.len();
        info!(occupations = total, "starting occupation scrape");

        let mut reporter = ProgressReporter::new(self.config.report_interval());
        let mut collected: Vec<OccupationRecord> = Vec::new();
        let mut failed = 0usize;
        let mut processed = 0usize;
        let mut cancelled = false;

        for entry in catalog.values() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            match self.scrape_item(entry).await {
                Some(record) => {
                    debug!(title = %record.title, "occupation scraped");
                    collected.push(record);
                }
                None => {
                    warn!(title = %entry.title, "occupation skipped after retries");
                    failed += 1;
                }
            }
            processed += 1;

            if reporter.should_report() {
                reporter.report(processed, total, collected.len(), failed);
            }

            if self.config.checkpoint_interval > 0
                && processed % self.config.checkpoint_interval == 0
            {
                match self.checkpoints.write(&collected) {
                    Ok(path) => info!(path = %path.display(), "intermediate results saved"),
                    Err(e) => warn!(error = %e, "checkpoint write failed, continuing"),
                }
            }

            // Polite pacing between items; a cancel request cuts the
            // wait short.
            tokio::select! {
                _ = tokio::time::sleep(self.config.item_delay()) => {}
                _ = self.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
            }
        }

        reporter.report(processed, total, collected.len(), failed);
        if cancelled {
            warn!(
                collected = collected.len(),
                "run interrupted, saving partial results"
            );
        }

        let stats = HarvestStats {
            scraped: collected.len(),
            failed,
            discovered: total,
            cancelled,
        };

        let merged = merge_by_title(existing, collected, policy);
        let saved = save_final(output_dir, &merged)?;
        log_dataset_overview(&merged);

        let deleted = self.checkpoints.cleanup();
        debug!(deleted, "temporary checkpoint files removed");

        Ok(HarvestOutcome {
            records: merged,
            stats,
            saved,
        })
    }

    async fn scrape_item(&self, entry: &CatalogEntry) -> Option<OccupationRecord> {
        let body = fetch_with_retry(&self.fetcher, entry.url.as_str(), &self.config).await?;
        Some(self.extractor.extract_record(entry, &body))
    }
}
