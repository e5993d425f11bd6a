use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Remote,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Remote => "remote",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full-time" | "full_time" | "fulltime" => Some(JobType::FullTime),
            "part-time" | "part_time" | "parttime" => Some(JobType::PartTime),
            "contract" => Some(JobType::Contract),
            "remote" => Some(JobType::Remote),
            _ => None,
        }
    }
}

/// Canonical unit produced by a discovery run.
///
/// Built once by a site adapter (through the normalizer) or by the fallback
/// generator, then handed to the orchestrator unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary_range: Option<String>,
    pub job_type: JobType,
    pub source_url: String,
    /// Display name of the originating adapter, e.g. `JustJoinIT` or `GitLab Careers`.
    pub source: String,
    /// Id of the originating adapter, e.g. `careerpages` for every career-page record.
    #[serde(default)]
    pub source_id: String,
    pub posted_date: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
}

/// A career page the caller wants covered. Accepts either a bare URL or a
/// `{name, url}` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanyTarget {
    Url(String),
    Named {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        url: String,
    },
}

impl CompanyTarget {
    pub fn named(name: &str, url: &str) -> Self {
        CompanyTarget::Named {
            name: Some(name.to_string()),
            url: url.to_string(),
        }
    }
}

/// Input to a discovery run. Locations and titles are soft filters: adapters
/// that support them narrow their own output, they never shape the query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Adapter ids to query. Empty means every known source.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub job_titles: Vec<String>,
    #[serde(default)]
    pub companies: Vec<CompanyTarget>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    pub run_id: Uuid,
    pub jobs: Vec<JobRecord>,
    pub jobs_found: usize,
    /// Adapter ids that actually ran, in execution order.
    pub sources_scraped: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DiscoveredJobRow {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary_range: Option<String>,
    pub job_type: String,
    pub source_url: String,
    pub source: String,
    pub source_id: String,
    pub posted_date: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
}

impl DiscoveredJobRow {
    pub fn into_record(self) -> JobRecord {
        JobRecord {
            job_id: self.job_id,
            title: self.title,
            company: self.company,
            location: self.location,
            description: self.description,
            requirements: self.requirements,
            salary_range: self.salary_range,
            job_type: JobType::parse(&self.job_type).unwrap_or_default(),
            source_url: self.source_url,
            source: self.source,
            source_id: self.source_id,
            posted_date: self.posted_date,
            scraped_at: self.scraped_at,
        }
    }
}
