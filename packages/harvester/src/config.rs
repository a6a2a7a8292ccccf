//! Configuration for the harvest pipeline.
//!
//! All timing knobs are plain integers (milliseconds/seconds) so the
//! config stays serializable, with helper methods returning
//! `Duration`. Tests shrink the backoffs to milliseconds; production
//! uses the defaults, which match the polite pacing the source site
//! expects.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The standard occupational groupings, keyed by SOC major group id.
pub const OCCUPATION_FAMILIES: [(u16, &str); 22] = [
    (15, "Computer and Mathematical Occupations"),
    (13, "Business and Financial Operations"),
    (11, "Management Occupations"),
    (17, "Architecture and Engineering"),
    (19, "Life, Physical, and Social Science"),
    (21, "Community and Social Service"),
    (23, "Legal Occupations"),
    (25, "Education, Training, and Library"),
    (27, "Arts, Design, Entertainment, Sports, and Media"),
    (29, "Healthcare Practitioners and Technical"),
    (31, "Healthcare Support"),
    (33, "Protective Service"),
    (35, "Food Preparation and Serving Related"),
    (37, "Building and Grounds Cleaning and Maintenance"),
    (39, "Personal Care and Service"),
    (41, "Sales and Related"),
    (43, "Office and Administrative Support"),
    (45, "Farming, Fishing, and Forestry"),
    (47, "Construction and Extraction"),
    (49, "Installation, Maintenance, and Repair"),
    (51, "Production"),
    (53, "Transportation and Material Moving"),
];

/// Configuration for a harvest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Site root; listing and summary URLs resolve against this
    pub base_url: String,

    /// Occupational families to discover, `(id, name)` pairs
    pub families: Vec<(u16, String)>,

    /// Maximum fetch attempts per URL
    pub max_attempts: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Fixed backoff after a timeout, milliseconds
    pub timeout_backoff_ms: u64,

    /// Base for exponential backoff after other failures
    /// (`base * 2^attempt`), milliseconds
    pub retry_backoff_ms: u64,

    /// Delay between family listing fetches, milliseconds
    pub category_delay_ms: u64,

    /// Delay between item detail fetches, milliseconds
    pub item_delay_ms: u64,

    /// Write a checkpoint every this many processed items (0 disables)
    pub checkpoint_interval: usize,

    /// Minimum seconds between progress reports
    pub report_interval_secs: u64,

    /// Heuristic keyword lists used by the extractors
    pub vocabulary: Vocabulary,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.onetonline.org".to_string(),
            families: OCCUPATION_FAMILIES
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
            max_attempts: 3,
            request_timeout_secs: 30,
            timeout_backoff_ms: 5_000,
            retry_backoff_ms: 1_000,
            category_delay_ms: 2_000,
            item_delay_ms: 2_000,
            checkpoint_interval: 25,
            report_interval_secs: 600,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl HarvestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_families(mut self, families: Vec<(u16, String)>) -> Self {
        self.families = families;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Shrink every delay and backoff to the given milliseconds.
    /// Intended for tests and dry runs.
    pub fn with_fast_timing(mut self, ms: u64) -> Self {
        self.timeout_backoff_ms = ms;
        self.retry_backoff_ms = ms;
        self.category_delay_ms = ms;
        self.item_delay_ms = ms;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn timeout_backoff(&self) -> Duration {
        Duration::from_millis(self.timeout_backoff_ms)
    }

    /// Exponential backoff for non-timeout failures: `base * 2^attempt`.
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16)))
    }

    pub fn category_delay(&self) -> Duration {
        Duration::from_millis(self.category_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

/// Keyword allow-lists driving the heuristic extractors.
///
/// Injected configuration rather than embedded literals, so extraction
/// rules can be exercised in isolation from the network layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Action verbs marking descriptions and work activities
    pub action_verbs: Vec<String>,
    /// Technology skill terms matched case-insensitively as substrings
    pub tech_skills: Vec<String>,
    pub education_keywords: Vec<String>,
    pub context_keywords: Vec<String>,
    pub knowledge_keywords: Vec<String>,
    pub ability_keywords: Vec<String>,
    pub style_keywords: Vec<String>,
    pub task_keywords: Vec<String>,
    pub tool_keywords: Vec<String>,
    pub value_keywords: Vec<String>,
    pub growth_keywords: Vec<String>,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            action_verbs: strings(&[
                "analyze",
                "develop",
                "design",
                "manage",
                "implement",
                "create",
                "provide",
                "maintain",
                "operate",
                "supervise",
            ]),
            tech_skills: strings(&[
                "Python",
                "Java",
                "JavaScript",
                "C++",
                "C#",
                "R",
                "MATLAB",
                "Go",
                "Rust",
                "Swift",
                "HTML",
                "CSS",
                "React",
                "Angular",
                "Vue.js",
                "Node.js",
                "Django",
                "Flask",
                "Spring",
                "TensorFlow",
                "PyTorch",
                "Scikit-learn",
                "Pandas",
                "NumPy",
                "Apache Spark",
                "Hadoop",
                "Kubernetes",
                "Docker",
                "AWS",
                "Azure",
                "Google Cloud",
                "Git",
                "Linux",
                "Machine Learning",
                "Deep Learning",
                "Data Science",
                "Big Data",
                "Cloud Computing",
                "DevOps",
                "Agile",
                "Scrum",
                "Tableau",
                "Power BI",
                "Excel",
                "MongoDB",
                "PostgreSQL",
                "MySQL",
                "SQL",
                "Apache Kafka",
                "RabbitMQ",
                "Kotlin",
                "Scala",
                "PHP",
                "Ruby",
                "Perl",
                "TypeScript",
                "Dart",
                "Express.js",
                "Laravel",
                "ASP.NET",
                "jQuery",
                "Bootstrap",
                "Keras",
                "OpenCV",
                "NLTK",
                "spaCy",
                "Jenkins",
                "GitLab CI",
                "GitHub Actions",
                "Ansible",
                "Chef",
                "Puppet",
                "Terraform",
                "Apache Airflow",
            ]),
            education_keywords: strings(&[
                "bachelor",
                "master",
                "phd",
                "doctorate",
                "associate",
                "high school",
                "college",
                "university",
                "degree",
                "certification",
                "diploma",
            ]),
            context_keywords: strings(&[
                "office",
                "field",
                "laboratory",
                "factory",
                "remote",
                "travel",
                "team",
                "independent",
                "outdoor",
                "indoor",
            ]),
            knowledge_keywords: strings(&[
                "mathematics",
                "science",
                "engineering",
                "technology",
                "business",
                "law",
                "medicine",
                "education",
                "psychology",
            ]),
            ability_keywords: strings(&[
                "ability",
                "skill",
                "capability",
                "proficiency",
                "competence",
            ]),
            style_keywords: strings(&[
                "detail",
                "integrity",
                "dependability",
                "cooperation",
                "initiative",
                "leadership",
                "stress",
                "adaptability",
                "achievement",
                "independence",
            ]),
            task_keywords: strings(&[
                "task",
                "duty",
                "responsibility",
                "function",
                "perform",
                "execute",
                "complete",
            ]),
            tool_keywords: strings(&[
                "software",
                "hardware",
                "tool",
                "equipment",
                "system",
                "platform",
                "application",
                "database",
                "server",
            ]),
            value_keywords: strings(&[
                "achievement",
                "recognition",
                "relationships",
                "support",
                "working conditions",
                "independence",
                "variety",
                "compensation",
                "advancement",
                "security",
            ]),
            growth_keywords: strings(&[
                "growth",
                "increase",
                "decrease",
                "decline",
                "projected",
                "outlook",
                "employment",
                "demand",
            ]),
        }
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tech_skills(mut self, skills: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tech_skills = skills.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn with_action_verbs(mut self, verbs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.action_verbs = verbs.into_iter().map(|v| v.into()).collect();
        self
    }
}
