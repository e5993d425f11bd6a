//! Turns raw extracted fields into canonical `JobRecord`s.
//!
//! Adapters never build records by hand: every field they could not read
//! stays `None` in a `RawListing` and is filled here from the adapter's
//! `FieldDefaults`.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::models::job::{JobRecord, JobType};

/// Used when neither the listing nor the adapter defaults name a requirement.
const GENERIC_REQUIREMENT: &str = "See the posting for detailed requirements";

/// Fields an adapter managed to read for one listing. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub requirements: Vec<String>,
    pub job_type: Option<JobType>,
    pub posted_date: Option<DateTime<Utc>>,
}

/// Per-adapter substitution rules.
///
/// `description` may reference `{title}` and `{company}`; both are replaced
/// with the resolved values.
#[derive(Debug, Clone)]
pub struct FieldDefaults {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    /// Salary text that means "not disclosed"; normalized to `None`.
    pub undisclosed_salary: Option<String>,
    pub description: String,
    pub requirements: Vec<String>,
    pub job_type: JobType,
    pub source_url: String,
    pub max_posted_age_days: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobIdScheme {
    /// `{source}_{ordinal}_{epoch-seconds}`. Unique within a run only.
    #[default]
    Timestamped,
    /// `{source}_{sha256(source|title|company|location)[..16]}`. Stable across runs.
    ContentHash,
}

impl JobIdScheme {
    pub fn job_id(&self, source_id: &str, ordinal: usize, record: &JobRecord) -> String {
        match self {
            JobIdScheme::Timestamped => {
                format!("{source_id}_{ordinal}_{}", record.scraped_at.timestamp())
            }
            JobIdScheme::ContentHash => {
                let mut hasher = Sha256::new();
                for part in [
                    source_id,
                    record.title.as_str(),
                    record.company.as_str(),
                    record.location.as_str(),
                ] {
                    hasher.update(part.to_lowercase().as_bytes());
                    hasher.update(b"|");
                }
                let digest = hex::encode(hasher.finalize());
                format!("{source_id}_{}", &digest[..16])
            }
        }
    }
}

/// Wall clock that never runs backwards within one discovery run.
#[derive(Debug, Default)]
pub struct RunClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl RunClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Utc::now();
        let stamp = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}

/// Normalizes the listings of one source within one run.
pub struct Normalizer<'a> {
    pub source_id: &'a str,
    pub source_name: &'a str,
    pub defaults: &'a FieldDefaults,
    pub clock: &'a RunClock,
    pub id_scheme: JobIdScheme,
}

impl Normalizer<'_> {
    pub fn normalize(&self, ordinal: usize, raw: RawListing) -> JobRecord {
        let defaults = self.defaults;
        let title = present(raw.title).unwrap_or_else(|| defaults.title.clone());
        let company = present(raw.company).unwrap_or_else(|| defaults.company.clone());
        let location = present(raw.location).unwrap_or_else(|| defaults.location.clone());

        let salary_range = present(raw.salary)
            .or_else(|| defaults.salary.clone())
            .filter(|salary| {
                defaults
                    .undisclosed_salary
                    .as_deref()
                    .map_or(true, |undisclosed| !salary.eq_ignore_ascii_case(undisclosed))
            });

        let description = present(raw.description).unwrap_or_else(|| {
            defaults
                .description
                .replace("{title}", &title)
                .replace("{company}", &company)
        });

        let mut requirements: Vec<String> = raw
            .requirements
            .into_iter()
            .filter_map(|r| present(Some(r)))
            .collect();
        if requirements.is_empty() {
            requirements = defaults.requirements.clone();
        }
        if requirements.is_empty() {
            requirements.push(GENERIC_REQUIREMENT.to_string());
        }

        let scraped_at = self.clock.now();
        let posted_date = raw.posted_date.unwrap_or_else(|| {
            scraped_at - Duration::days(fastrand::i64(0..=defaults.max_posted_age_days.max(0)))
        });

        let mut record = JobRecord {
            job_id: String::new(),
            title,
            company,
            location,
            description,
            requirements,
            salary_range,
            job_type: raw.job_type.unwrap_or(defaults.job_type),
            source_url: present(raw.link).unwrap_or_else(|| defaults.source_url.clone()),
            source: self.source_name.to_string(),
            source_id: self.source_id.to_string(),
            posted_date,
            scraped_at,
        };
        record.job_id = self.id_scheme.job_id(self.source_id, ordinal, &record);
        record
    }
}

/// Trims a value and drops it when nothing is left.
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
