//! Periodic crash-recovery checkpoints.
//!
//! Checkpoints are append-only: every write produces a NEW timestamped
//! file, nothing is overwritten, and the same run never reads one
//! back. They exist purely so a crashed or interrupted run leaves
//! something to recover by hand. After a confirmed final save the
//! store deletes its own files (including leftovers from earlier
//! crashed runs that used the same prefix).

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::types::OccupationRecord;

/// Seam for checkpoint persistence, so the pipeline can be tested
/// without a filesystem.
pub trait CheckpointStore: Send {
    /// Serialize the accumulated records to a new checkpoint artifact.
    fn write(&mut self, records: &[OccupationRecord]) -> Result<PathBuf>;

    /// Remove this store's checkpoint artifacts. Individual deletion
    /// failures are logged and skipped. Returns the number deleted.
    fn cleanup(&mut self) -> usize;
}

/// Writes checkpoints as timestamped JSON files under one directory.
pub struct JsonCheckpointStore {
    dir: PathBuf,
    prefix: String,
    sequence: u32,
}

impl JsonCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_prefix(dir, "checkpoint_occupations")
    }

    pub fn with_prefix(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            sequence: 0,
        }
    }

    fn is_own_checkpoint(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(self.prefix.as_str()) && name.ends_with(".json"))
            .unwrap_or(false)
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn write(&mut self, records: &[OccupationRecord]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        // Sequence number disambiguates two checkpoints within the
        // same second.
        self.sequence += 1;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .dir
            .join(format!("{}_{}_{:03}.json", self.prefix, timestamp, self.sequence));

        let file = fs::File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), records)?;

        debug!(path = %path.display(), records = records.len(), "checkpoint written");
        Ok(path)
    }

    fn cleanup(&mut self) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "cannot scan checkpoint directory");
                return 0;
            }
        };

        let mut deleted = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !self.is_own_checkpoint(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "deleted checkpoint file");
                    deleted += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unable to delete checkpoint file");
                }
            }
        }

        info!(deleted, "checkpoint cleanup finished");
        deleted
    }
}
