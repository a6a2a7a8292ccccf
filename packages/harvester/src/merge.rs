//! Merging persisted datasets with a fresh run's records.
//!
//! Deduplication is by title with a seen-set keeping the first
//! occurrence, so precedence is decided by concatenation order. That
//! order is an explicit [`MergePolicy`] rather than an accident:
//! `PreferExisting` reproduces the historical behavior (previously
//! saved data wins a title conflict), `PreferNew` lets freshly scraped
//! data replace stale records and is the pipeline default.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::types::OccupationRecord;

/// Which side of a title conflict survives the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Previously persisted records win (historical behavior)
    PreferExisting,
    /// Freshly scraped records win
    #[default]
    PreferNew,
}

/// Merge two record collections, deduplicating by title.
///
/// Output length never exceeds the sum of the inputs, and merging a
/// deduplicated collection with itself is a no-op.
pub fn merge_by_title(
    existing: Vec<OccupationRecord>,
    fresh: Vec<OccupationRecord>,
    policy: MergePolicy,
) -> Vec<OccupationRecord> {
    let total_in = existing.len() + fresh.len();
    let winner_first: Vec<OccupationRecord> = match policy {
        MergePolicy::PreferExisting => existing.into_iter().chain(fresh).collect(),
        MergePolicy::PreferNew => fresh.into_iter().chain(existing).collect(),
    };

    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(winner_first.len());
    for record in winner_first {
        if seen.insert(record.title.clone()) {
            merged.push(record);
        }
    }

    info!(
        input = total_in,
        merged = merged.len(),
        dropped = total_in - merged.len(),
        "merged datasets"
    );
    merged
}

/// Load previously saved records from JSON artifacts.
///
/// Unreadable or malformed files are logged and skipped; merging
/// should never block a new run.
pub fn load_saved_records(paths: &[impl AsRef<Path>]) -> Vec<OccupationRecord> {
    let mut records = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match read_records(path) {
            Ok(mut loaded) => {
                info!(path = %path.display(), records = loaded.len(), "loaded existing dataset");
                records.append(&mut loaded);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable dataset");
            }
        }
    }

    records
}

fn read_records(path: &Path) -> Result<Vec<OccupationRecord>> {
    let body = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, salary: &str) -> OccupationRecord {
        let mut r = OccupationRecord::new(title, "https://example.com");
        r.salary_median = salary.to_string();
        r
    }

    #[test]
    fn test_existing_wins_under_prefer_existing() {
        let existing = vec![record("X", "100")];
        let fresh = vec![record("X", "200"), record("Y", "50")];

        let merged = merge_by_title(existing, fresh, MergePolicy::PreferExisting);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "X");
        assert_eq!(merged[0].salary_median, "100");
        assert_eq!(merged[1].title, "Y");
        assert_eq!(merged[1].salary_median, "50");
    }

    #[test]
    fn test_fresh_wins_under_prefer_new() {
        let existing = vec![record("X", "100")];
        let fresh = vec![record("X", "200"), record("Y", "50")];

        let merged = merge_by_title(existing, fresh, MergePolicy::PreferNew);

        assert_eq!(merged.len(), 2);
        let x = merged.iter().find(|r| r.title == "X").unwrap();
        assert_eq!(x.salary_median, "200");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let data = vec![record("A", "1"), record("B", "2"), record("C", "3")];

        let merged = merge_by_title(data.clone(), data.clone(), MergePolicy::PreferExisting);
        assert_eq!(merged.len(), data.len());

        let again = merge_by_title(merged.clone(), Vec::new(), MergePolicy::PreferExisting);
        assert_eq!(again.len(), merged.len());
    }

    #[test]
    fn test_output_never_exceeds_input_sum() {
        let existing = vec![record("A", "1"), record("B", "2")];
        let fresh = vec![record("C", "3")];

        let merged = merge_by_title(existing, fresh, MergePolicy::PreferNew);
        assert!(merged.len() <= 3);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_load_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, serde_json::to_string(&vec![record("A", "1")]).unwrap()).unwrap();
        std::fs::write(&bad, "not json").unwrap();
        let missing = dir.path().join("missing.json");

        let records = load_saved_records(&[good, bad, missing]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "A");
    }
}
