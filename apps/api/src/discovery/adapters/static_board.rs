//! Adapter for a server-rendered job board with no stable field markup (InHire).
//!
//! Containers are found by class name alone. Titles are ordinal placeholders
//! and descriptions are excerpts of the container text.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

use crate::discovery::adapters::{
    element_text, parse_selector, AdapterContext, AdapterError, SiteAdapter,
};
use crate::discovery::normalizer::{FieldDefaults, Normalizer, RawListing};
use crate::discovery::politeness::Politeness;
use crate::models::job::{DiscoveryRequest, JobRecord, JobType};

pub const SOURCE_ID: &str = "inhire";

#[derive(Debug, Clone)]
pub struct StaticBoardConfig {
    pub name: String,
    pub base_url: String,
    pub jobs_path: String,
    /// Element names scanned for job containers.
    pub container_tags: Vec<String>,
    /// A container matches when its class attribute contains any of these (case-insensitive).
    pub class_keywords: Vec<String>,
    pub title_prefix: String,
    pub description_prefix: String,
    pub excerpt_chars: usize,
    pub defaults: FieldDefaults,
}

impl Default for StaticBoardConfig {
    fn default() -> Self {
        let base_url = "https://inhire.io".to_string();
        Self {
            name: "InHire".to_string(),
            jobs_path: "/jobs".to_string(),
            container_tags: vec!["div".to_string(), "article".to_string()],
            class_keywords: vec![
                "job".to_string(),
                "position".to_string(),
                "listing".to_string(),
            ],
            title_prefix: "Developer Position".to_string(),
            description_prefix: "Great opportunity for developers.".to_string(),
            excerpt_chars: 200,
            defaults: FieldDefaults {
                title: "Developer Position".to_string(),
                company: "InHire Partner Company".to_string(),
                location: "Europe".to_string(),
                salary: Some("Competitive".to_string()),
                undisclosed_salary: None,
                description: "Exciting development role with growth opportunities.".to_string(),
                requirements: vec![
                    "Programming experience".to_string(),
                    "Problem-solving skills".to_string(),
                    "Team collaboration".to_string(),
                    "Continuous learning mindset".to_string(),
                ],
                job_type: JobType::FullTime,
                source_url: base_url.clone(),
                max_posted_age_days: 7,
            },
            base_url,
        }
    }
}

impl StaticBoardConfig {
    pub fn jobs_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.jobs_path)
    }
}

pub struct StaticBoardAdapter {
    config: StaticBoardConfig,
}

impl StaticBoardAdapter {
    pub fn new(config: StaticBoardConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SiteAdapter for StaticBoardAdapter {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &str {
        &self.config.name
    }

    async fn scrape(
        &self,
        _request: &DiscoveryRequest,
        ctx: &AdapterContext<'_>,
    ) -> Result<Vec<JobRecord>, AdapterError> {
        let fetcher = ctx.backends.fetcher()?;
        let url = self.config.jobs_url();

        info!(source = SOURCE_ID, url = %url, "Fetching job board");
        let response = fetcher.fetch_static(&url).await?;
        if response.status != 200 {
            return Err(AdapterError::Status {
                status: response.status,
                url,
            });
        }

        let listings = extract_containers(&response.body, &self.config, ctx.politeness)?;

        let normalizer = Normalizer {
            source_id: SOURCE_ID,
            source_name: &self.config.name,
            defaults: &self.config.defaults,
            clock: ctx.clock,
            id_scheme: ctx.id_scheme,
        };
        Ok(listings
            .into_iter()
            .enumerate()
            .map(|(ordinal, raw)| normalizer.normalize(ordinal, raw))
            .collect())
    }
}

/// Finds job containers and turns each into a placeholder listing.
fn extract_containers(
    html: &str,
    config: &StaticBoardConfig,
    politeness: &Politeness,
) -> Result<Vec<RawListing>, AdapterError> {
    let selector: Selector = parse_selector(&config.container_tags.join(", "))?;
    let keywords: Vec<String> = config
        .class_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();

    let document = Html::parse_document(html);
    let containers: Vec<ElementRef<'_>> = document
        .select(&selector)
        .filter(|el| {
            el.value().attr("class").is_some_and(|class| {
                let class = class.to_lowercase();
                keywords.iter().any(|k| class.contains(k.as_str()))
            })
        })
        .collect();
    let containers = politeness.cap(containers);

    Ok(containers
        .into_iter()
        .enumerate()
        .map(|(index, container)| RawListing {
            title: Some(format!("{} {}", config.title_prefix, index + 1)),
            description: excerpt(&element_text(container), config.excerpt_chars)
                .map(|text| format!("{} {text}...", config.description_prefix)),
            ..RawListing::default()
        })
        .collect())
}

/// First `max_chars` characters of `text`, or `None` when it is empty.
fn excerpt(text: &str, max_chars: usize) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(max_chars).collect())
}
