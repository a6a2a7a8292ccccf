//! Heuristic field extraction from fetched occupation pages.
//!
//! Each extractor is independent and bounded: text-length filters plus
//! keyword allow-lists from the injected [`Vocabulary`], with a cap on
//! the number of matches kept. None of them can fail — a page where a
//! heuristic finds nothing yields an empty field, which is a valid
//! record. All parsing is synchronous over an already-fetched body so
//! the async pipeline never holds a DOM across an await.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::config::Vocabulary;
use crate::discovery::occupation_code;
use crate::types::{CatalogEntry, OccupationRecord};

/// Battery of heuristic extractors over one page.
pub struct Extractor {
    vocab: Vocabulary,
    salary_patterns: Vec<Regex>,
}

impl Extractor {
    pub fn new(vocab: Vocabulary) -> Self {
        let salary_patterns = vec![
            Regex::new(r"\$[\d,]+(?:\.\d{2})?").expect("valid salary pattern"),
            Regex::new(r"[\d,]+(?:\.\d{2})?\s*(?:dollars?|USD)").expect("valid salary pattern"),
        ];
        Self {
            vocab,
            salary_patterns,
        }
    }

    /// Build a full record for one catalog entry from its page body.
    pub fn extract_record(&self, entry: &CatalogEntry, body: &str) -> OccupationRecord {
        let document = Html::parse_document(body);
        let page_text = document.root_element().text().collect::<String>();

        let mut record = OccupationRecord::new(&entry.title, entry.url.as_str());
        record.occupation_code = occupation_code(&entry.url).unwrap_or_default();
        record.occupation_family = entry.family_name.clone();
        record.occupation_family_id = entry.family_id;

        record.description = self.description(&document);
        record.salary_median = self.salary(&page_text);
        record.skills = self.skills(&document);
        record.technology_skills = self.technology_skills(&page_text);
        record.education_level = first_keyword_sentence(&page_text, &self.vocab.education_keywords);
        record.job_growth = first_keyword_sentence(&page_text, &self.vocab.growth_keywords);
        record.work_activities = self.work_activities(&document);
        record.work_context = keyword_sentences(&page_text, &self.vocab.context_keywords, 5);
        record.work_styles = keyword_sentences(&page_text, &self.vocab.style_keywords, 5);
        record.work_values = keyword_sentences(&page_text, &self.vocab.value_keywords, 5);
        record.knowledge_areas = bounded_keyword_texts(
            &element_texts(&document, "li, td, span"),
            &self.vocab.knowledge_keywords,
            5..100,
            10,
            true,
        );
        record.abilities = bounded_keyword_texts(
            &element_texts(&document, "li, td, span"),
            &self.vocab.ability_keywords,
            5..100,
            10,
            false,
        );
        record.tasks = bounded_keyword_texts(
            &element_texts(&document, "li, p, td"),
            &self.vocab.task_keywords,
            15..200,
            10,
            false,
        );
        record.tools_used = bounded_keyword_texts(
            &element_texts(&document, "li, td, span"),
            &self.vocab.tool_keywords,
            3..100,
            15,
            true,
        );

        record
    }

    /// First paragraph longer than 100 chars that reads like a duty
    /// statement (contains an action verb).
    fn description(&self, document: &Html) -> String {
        element_texts(document, "p")
            .into_iter()
            .find(|text| text.len() > 100 && contains_any(text, &self.vocab.action_verbs))
            .unwrap_or_default()
    }

    /// First dollar-amount-looking string on the page.
    fn salary(&self, page_text: &str) -> String {
        self.salary_patterns
            .iter()
            .find_map(|pattern| pattern.find(page_text))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// Elements whose class mentions skill/ability, plus table cells.
    /// Candidates must be 3–100 chars; duplicates dropped.
    fn skills(&self, document: &Html) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Ok(selector) = Selector::parse("li, td, span") {
            for el in document.select(&selector) {
                let class = el.value().attr("class").unwrap_or("").to_lowercase();
                if class.contains("skill") || class.contains("ability") {
                    candidates.push(el.text().collect::<String>().trim().to_string());
                }
            }
        }
        if let Ok(selector) = Selector::parse("table td, table th") {
            for el in document.select(&selector) {
                candidates.push(el.text().collect::<String>().trim().to_string());
            }
        }

        dedup_first_seen(
            candidates
                .into_iter()
                .filter(|text| text.len() > 3 && text.len() < 100),
        )
    }

    /// Case-insensitive substring match against the technology
    /// vocabulary, preserving the vocabulary's canonical spelling.
    fn technology_skills(&self, page_text: &str) -> Vec<String> {
        let lower = page_text.to_lowercase();
        self.vocab
            .tech_skills
            .iter()
            .filter(|skill| lower.contains(&skill.to_lowercase()))
            .cloned()
            .collect()
    }

    /// 20–200 char blocks containing an action verb, top 10.
    fn work_activities(&self, document: &Html) -> Vec<String> {
        element_texts(document, "li, p, td")
            .into_iter()
            .filter(|text| {
                text.len() > 20 && text.len() < 200 && contains_any(text, &self.vocab.action_verbs)
            })
            .take(10)
            .collect()
    }
}

/// Trimmed text of every element matching `selector`, in document order.
fn element_texts(document: &Html, selector: &str) -> Vec<String> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

/// Keep first occurrence of each candidate; deterministic, unlike a
/// hash-set collection pass.
fn dedup_first_seen(candidates: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.clone()) {
            unique.push(candidate);
        }
    }
    unique
}

/// Filter element texts by length bounds and keyword allow-list,
/// optionally dedup, cap the result.
fn bounded_keyword_texts(
    texts: &[String],
    keywords: &[String],
    bounds: std::ops::Range<usize>,
    cap: usize,
    dedup: bool,
) -> Vec<String> {
    let filtered = texts
        .iter()
        .filter(|text| {
            text.len() > bounds.start && text.len() < bounds.end && contains_any(text, keywords)
        })
        .cloned();

    let mut result = if dedup {
        dedup_first_seen(filtered)
    } else {
        filtered.collect()
    };
    result.truncate(cap);
    result
}

/// For each keyword present on the page, the first sentence (>10
/// chars) mentioning it, capped.
fn keyword_sentences(page_text: &str, keywords: &[String], cap: usize) -> Vec<String> {
    let lower = page_text.to_lowercase();
    let mut matches = Vec::new();

    for keyword in keywords {
        if matches.len() >= cap {
            break;
        }
        if !lower.contains(keyword.as_str()) {
            continue;
        }
        if let Some(sentence) = page_text.split('.').find(|sentence| {
            sentence.to_lowercase().contains(keyword.as_str()) && sentence.trim().len() > 10
        }) {
            matches.push(sentence.trim().to_string());
        }
    }

    matches
}

/// First sentence (>10 chars) mentioning any of the keywords, or empty.
fn first_keyword_sentence(page_text: &str, keywords: &[String]) -> String {
    let lower = page_text.to_lowercase();
    for keyword in keywords {
        if !lower.contains(keyword.as_str()) {
            continue;
        }
        if let Some(sentence) = page_text.split('.').find(|sentence| {
            sentence.to_lowercase().contains(keyword.as_str()) && sentence.trim().len() > 10
        }) {
            return sentence.trim().to_string();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn entry(title: &str, url: &str) -> CatalogEntry {
        CatalogEntry {
            title: title.to_string(),
            url: Url::parse(url).unwrap(),
            family_name: "Computer and Mathematical Occupations".to_string(),
            family_id: 15,
        }
    }

    fn extractor() -> Extractor {
        Extractor::new(Vocabulary::default())
    }

    const SAMPLE_PAGE: &str = r#"<html><body>
        <p>Data scientists analyze large volumes of information to develop models,
        design experiments, and provide actionable recommendations to stakeholders
        across the organization.</p>
        <p>Short note.</p>
        <p>Median wages: $108,020 annual.</p>
        <p>Most positions require a bachelor degree in a quantitative field.</p>
        <p>Employment is projected to grow much faster than average.</p>
        <ul>
            <li class="skill-item">Critical Thinking</li>
            <li class="skill-item">Critical Thinking</li>
            <li>Develop dashboards and analyze pipelines for production systems</li>
            <li>Use database software and reporting equipment daily</li>
        </ul>
        <p>Experience with Python, SQL and Docker is expected. Works in an office
        setting as part of a team.</p>
    </body></html>"#;

    #[test]
    fn test_full_record_extraction() {
        let record = extractor().extract_record(
            &entry(
                "Data Scientists",
                "https://www.onetonline.org/link/summary/15-2051.00",
            ),
            SAMPLE_PAGE,
        );

        assert_eq!(record.title, "Data Scientists");
        assert_eq!(record.occupation_code, "15-2051.00");
        assert_eq!(record.occupation_family_id, 15);
        assert!(record.description.contains("analyze large volumes"));
        assert_eq!(record.salary_median, "$108,020");
        assert!(record.education_level.contains("bachelor degree"));
        assert!(record.job_growth.contains("projected to grow"));
        assert!(record.skills.contains(&"Critical Thinking".to_string()));
        assert!(!record.work_activities.is_empty());
    }

    #[test]
    fn test_technology_skills_case_insensitive() {
        let record = extractor().extract_record(
            &entry("X", "https://www.onetonline.org/link/summary/15-2051.00"),
            "<html><body><p>Uses python, DOCKER, and PostgreSQL heavily.</p></body></html>",
        );

        assert!(record.technology_skills.contains(&"Python".to_string()));
        assert!(record.technology_skills.contains(&"Docker".to_string()));
        assert!(record
            .technology_skills
            .contains(&"PostgreSQL".to_string()));
        assert!(!record.technology_skills.contains(&"Rust".to_string()));
    }

    #[test]
    fn test_skills_deduplicated_and_bounded() {
        let record = extractor().extract_record(
            &entry("X", "https://www.onetonline.org/link/summary/15-2051.00"),
            SAMPLE_PAGE,
        );

        let critical = record
            .skills
            .iter()
            .filter(|s| *s == "Critical Thinking")
            .count();
        assert_eq!(critical, 1);
        assert!(record.skills.iter().all(|s| s.len() > 3 && s.len() < 100));
    }

    #[test]
    fn test_empty_page_yields_empty_fields_not_errors() {
        let record = extractor().extract_record(
            &entry("X", "https://www.onetonline.org/link/summary/15-2051.00"),
            "<html><body></body></html>",
        );

        assert!(record.description.is_empty());
        assert!(record.salary_median.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.technology_skills.is_empty());
        assert!(record.work_activities.is_empty());
        assert!(record.education_level.is_empty());
    }

    #[test]
    fn test_work_activities_respect_length_bounds_and_cap() {
        let items: String = (0..20)
            .map(|i| format!("<li>Develop component {i} and maintain its release pipeline</li>"))
            .collect();
        let body = format!("<html><body><ul>{items}</ul></body></html>");

        let record = extractor().extract_record(
            &entry("X", "https://www.onetonline.org/link/summary/15-2051.00"),
            &body,
        );

        assert_eq!(record.work_activities.len(), 10);
        assert!(record
            .work_activities
            .iter()
            .all(|a| a.len() > 20 && a.len() < 200));
    }

    #[test]
    fn test_keyword_sentences_capped() {
        let vocab = Vocabulary::default();
        let text = "Works in an office daily. Travels to the field weekly. \
                    Runs a laboratory bench. Visits the factory floor. \
                    Sometimes remote work. Frequent travel required. \
                    Strong team culture here.";

        let sentences = keyword_sentences(text, &vocab.context_keywords, 5);

        assert_eq!(sentences.len(), 5);
    }

    #[test]
    fn test_first_keyword_sentence_empty_when_absent() {
        let vocab = Vocabulary::default();
        assert_eq!(
            first_keyword_sentence("Nothing relevant here.", &vocab.education_keywords),
            ""
        );
    }
}
