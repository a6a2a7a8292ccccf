//! Core data types for the harvest pipeline.

use serde::{Deserialize, Serialize};
use url::Url;

/// A single occupation link found during discovery.
///
/// Lives only in memory during the discovery → extraction handoff.
/// The discovery catalog is keyed by `title`, so a later family's
/// entry with the same title replaces an earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub url: Url,
    pub family_name: String,
    pub family_id: u16,
}

/// One occupation's scraped data.
///
/// Every extracted field is best-effort: an empty string or empty list
/// means the heuristic found nothing, which is a valid outcome, not an
/// error. Records are created once per item and never mutated after.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OccupationRecord {
    pub title: String,
    #[serde(default)]
    pub occupation_code: String,
    #[serde(default)]
    pub occupation_family: String,
    #[serde(default)]
    pub occupation_family_id: u16,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub technology_skills: Vec<String>,
    #[serde(default)]
    pub education_level: String,
    #[serde(default)]
    pub salary_median: String,
    #[serde(default)]
    pub job_growth: String,
    #[serde(default)]
    pub work_activities: Vec<String>,
    #[serde(default)]
    pub work_context: Vec<String>,
    #[serde(default)]
    pub knowledge_areas: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub work_styles: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub work_values: Vec<String>,
    pub url: String,
}

impl OccupationRecord {
    /// Create an empty record for a title/URL pair.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Counters describing a finished (or interrupted) run.
#[derive(Debug, Clone, Default)]
pub struct HarvestStats {
    /// Items successfully scraped this run
    pub scraped: usize,
    /// Items skipped after exhausting retries
    pub failed: usize,
    /// Total items the catalog offered
    pub discovered: usize,
    /// Whether the run was interrupted before finishing
    pub cancelled: bool,
}
