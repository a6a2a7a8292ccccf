//! Final dataset persistence: tabular CSV plus nested JSON.
//!
//! Both artifacts share one timestamp and the same field set; the CSV
//! flattens list fields by joining with `"; "` so the tabular form
//! stays one row per occupation.

use std::collections::HashMap;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::Result;
use crate::types::OccupationRecord;

/// Paths of the two artifacts produced by a final save.
#[derive(Debug, Clone)]
pub struct SavedDataset {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

const CSV_HEADER: [&str; 19] = [
    "title",
    "occupation_code",
    "occupation_family",
    "occupation_family_id",
    "description",
    "skills",
    "technology_skills",
    "education_level",
    "salary_median",
    "job_growth",
    "work_activities",
    "work_context",
    "knowledge_areas",
    "abilities",
    "work_styles",
    "tasks",
    "tools_used",
    "work_values",
    "url",
];

fn join(list: &[String]) -> String {
    list.join("; ")
}

/// Write the merged dataset to `dir` as CSV and JSON.
pub fn save_final(dir: &Path, records: &[OccupationRecord]) -> Result<SavedDataset> {
    fs::create_dir_all(dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = dir.join(format!("all_occupations_complete_{timestamp}.csv"));
    let json_path = dir.join(format!("all_occupations_complete_{timestamp}.json"));

    let mut writer = csv::Writer::from_path(&csv_path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.title.as_str(),
            record.occupation_code.as_str(),
            record.occupation_family.as_str(),
            &record.occupation_family_id.to_string(),
            record.description.as_str(),
            &join(&record.skills),
            &join(&record.technology_skills),
            record.education_level.as_str(),
            record.salary_median.as_str(),
            record.job_growth.as_str(),
            &join(&record.work_activities),
            &join(&record.work_context),
            &join(&record.knowledge_areas),
            &join(&record.abilities),
            &join(&record.work_styles),
            &join(&record.tasks),
            &join(&record.tools_used),
            &join(&record.work_values),
            record.url.as_str(),
        ])?;
    }
    writer.flush()?;

    let file = fs::File::create(&json_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;

    info!(
        csv = %csv_path.display(),
        json = %json_path.display(),
        records = records.len(),
        "final dataset saved"
    );

    Ok(SavedDataset {
        csv_path,
        json_path,
    })
}

/// Log a summary of field coverage and the most common technology
/// skills across the dataset.
pub fn log_dataset_overview(records: &[OccupationRecord]) {
    let with_description = records.iter().filter(|r| !r.description.is_empty()).count();
    let with_skills = records.iter().filter(|r| !r.skills.is_empty()).count();
    let with_tech = records
        .iter()
        .filter(|r| !r.technology_skills.is_empty())
        .count();
    let with_salary = records
        .iter()
        .filter(|r| !r.salary_median.is_empty())
        .count();
    let with_activities = records
        .iter()
        .filter(|r| !r.work_activities.is_empty())
        .count();

    info!(
        total = records.len(),
        with_description,
        with_skills,
        with_technology_skills = with_tech,
        with_salary,
        with_work_activities = with_activities,
        "dataset overview"
    );

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for skill in &record.technology_skills {
            *counts.entry(skill.as_str()).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    for (skill, count) in ranked.into_iter().take(20) {
        info!(skill, count, "top technology skill");
    }
}
