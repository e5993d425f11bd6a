//! Adapter for a JavaScript-rendered job board (JustJoinIT).
//!
//! Listings carry stable `data-test-id` markers, so fields are read through
//! sub-selectors. Missing sub-elements fall back to the field defaults rather
//! than failing the listing.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::discovery::adapters::{
    collect_listings, element_text, parse_selector, soft_filter, AdapterContext, AdapterError,
    ExtractionError, SiteAdapter,
};
use crate::discovery::normalizer::{FieldDefaults, Normalizer, RawListing};
use crate::discovery::politeness::Politeness;
use crate::models::job::{DiscoveryRequest, JobRecord, JobType};

pub const SOURCE_ID: &str = "justjoinit";

#[derive(Debug, Clone)]
pub struct RenderedBoardConfig {
    pub name: String,
    pub base_url: String,
    pub listing_url: String,
    pub item_selector: String,
    pub title_selector: String,
    pub company_selector: String,
    pub location_selector: String,
    pub salary_selector: String,
    pub link_selector: String,
    pub defaults: FieldDefaults,
}

impl Default for RenderedBoardConfig {
    fn default() -> Self {
        let listing_url = "https://justjoin.it/all-locations/javascript".to_string();
        Self {
            name: "JustJoinIT".to_string(),
            base_url: "https://justjoin.it".to_string(),
            item_selector: r#"[data-test-id="job-list-item"]"#.to_string(),
            title_selector: r#"[data-test-id="job-list-item-title"]"#.to_string(),
            company_selector: r#"[data-test-id="job-list-item-company"]"#.to_string(),
            location_selector: r#"[data-test-id="job-list-item-location"]"#.to_string(),
            salary_selector: r#"[data-test-id="job-list-item-salary"]"#.to_string(),
            link_selector: "a[href]".to_string(),
            defaults: FieldDefaults {
                title: "Software Developer".to_string(),
                company: "Tech Company".to_string(),
                location: "Remote".to_string(),
                salary: None,
                undisclosed_salary: Some("Competitive".to_string()),
                description: "Exciting opportunity at {company} for a {title} position. Join a dynamic team working on innovative projects.".to_string(),
                requirements: vec![
                    "Bachelor's degree in Computer Science or related field".to_string(),
                    "3+ years of relevant experience".to_string(),
                    "Strong problem-solving skills".to_string(),
                    "Team collaboration experience".to_string(),
                ],
                job_type: JobType::FullTime,
                source_url: listing_url.clone(),
                max_posted_age_days: 7,
            },
            listing_url,
        }
    }
}

pub struct RenderedBoardAdapter {
    config: RenderedBoardConfig,
}

impl RenderedBoardAdapter {
    pub fn new(config: RenderedBoardConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SiteAdapter for RenderedBoardAdapter {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &str {
        &self.config.name
    }

    async fn scrape(
        &self,
        request: &DiscoveryRequest,
        ctx: &AdapterContext<'_>,
    ) -> Result<Vec<JobRecord>, AdapterError> {
        let renderer = ctx.backends.renderer()?;

        info!(source = SOURCE_ID, url = %self.config.listing_url, "Loading listing page");
        let page = renderer
            .fetch_rendered(&self.config.listing_url, &self.config.item_selector)
            .await?;
        debug!(
            source = SOURCE_ID,
            url = %page.url,
            bytes = page.html.len(),
            "Rendered listing page"
        );
        ctx.politeness.delay().await;

        let items = extract_listings(&page.html, &self.config, ctx.politeness)?;
        let listings = collect_listings(SOURCE_ID, items);

        let normalizer = Normalizer {
            source_id: SOURCE_ID,
            source_name: &self.config.name,
            defaults: &self.config.defaults,
            clock: ctx.clock,
            id_scheme: ctx.id_scheme,
        };
        let jobs: Vec<JobRecord> = listings
            .into_iter()
            .enumerate()
            .map(|(ordinal, raw)| normalizer.normalize(ordinal, raw))
            .collect();

        let jobs = soft_filter(jobs, &request.locations, |j| j.location.as_str());
        Ok(soft_filter(jobs, &request.job_titles, |j| j.title.as_str()))
    }
}

struct BoardSelectors {
    item: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    salary: Selector,
    link: Selector,
}

impl BoardSelectors {
    fn parse(config: &RenderedBoardConfig) -> Result<Self, AdapterError> {
        Ok(Self {
            item: parse_selector(&config.item_selector)?,
            title: parse_selector(&config.title_selector)?,
            company: parse_selector(&config.company_selector)?,
            location: parse_selector(&config.location_selector)?,
            salary: parse_selector(&config.salary_selector)?,
            link: parse_selector(&config.link_selector)?,
        })
    }
}

/// Reads up to the per-site cap of listing items from a rendered DOM.
fn extract_listings(
    html: &str,
    config: &RenderedBoardConfig,
    politeness: &Politeness,
) -> Result<Vec<Result<RawListing, ExtractionError>>, AdapterError> {
    let selectors = BoardSelectors::parse(config)?;
    let base = Url::parse(&config.base_url).map_err(|source| AdapterError::BaseUrl {
        url: config.base_url.clone(),
        source,
    })?;

    let document = Html::parse_document(html);
    let items: Vec<ElementRef<'_>> = document.select(&selectors.item).collect();
    let items = politeness.cap(items);

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| extract_item(index, item, &selectors, &base))
        .collect())
}

fn extract_item(
    index: usize,
    item: ElementRef<'_>,
    selectors: &BoardSelectors,
    base: &Url,
) -> Result<RawListing, ExtractionError> {
    let text_of = |selector: &Selector| item.select(selector).next().map(element_text);

    let link = match item
        .select(&selectors.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
    {
        Some(href) if href.starts_with("http://") || href.starts_with("https://") => {
            Some(href.to_string())
        }
        Some(href) => Some(
            base.join(href)
                .map_err(|source| ExtractionError::BadLink {
                    index,
                    href: href.to_string(),
                    source,
                })?
                .to_string(),
        ),
        None => None,
    };

    Ok(RawListing {
        title: text_of(&selectors.title),
        company: text_of(&selectors.company),
        location: text_of(&selectors.location),
        salary: text_of(&selectors.salary),
        link,
        ..RawListing::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::fallback::default_pools;
    use crate::discovery::fetch::Backends;
    use crate::discovery::normalizer::{JobIdScheme, RunClock};
    use crate::discovery::politeness::PolitenessConfig;
    use crate::discovery::testing::{justjoinit_listing, quiet_politeness, FixtureRenderer};
    use std::sync::Arc;

    const FULL_ITEM: &str = r#"
        <li data-test-id="job-list-item">
          <a href="/offers/ferris-labs-rust-engineer">
            <h3 data-test-id="job-list-item-title">Rust Engineer</h3>
            <span data-test-id="job-list-item-company">Ferris Labs</span>
            <span data-test-id="job-list-item-location">Gdansk, Poland</span>
            <span data-test-id="job-list-item-salary">20 000 - 28 000 PLN</span>
          </a>
        </li>"#;

    const BARE_ITEM: &str = r#"<li data-test-id="job-list-item"><div>Promoted</div></li>"#;

    fn page(items: &[&str]) -> String {
        format!("<html><body><ul>{}</ul></body></html>", items.join(""))
    }

    #[test]
    fn test_extracts_fields_and_resolves_relative_link() {
        let config = RenderedBoardConfig::default();
        let items = extract_listings(&page(&[FULL_ITEM]), &config, &quiet_politeness()).unwrap();
        let raw = items.into_iter().next().unwrap().unwrap();
        assert_eq!(raw.title.as_deref(), Some("Rust Engineer"));
        assert_eq!(raw.company.as_deref(), Some("Ferris Labs"));
        assert_eq!(raw.location.as_deref(), Some("Gdansk, Poland"));
        assert_eq!(raw.salary.as_deref(), Some("20 000 - 28 000 PLN"));
        assert_eq!(
            raw.link.as_deref(),
            Some("https://justjoin.it/offers/ferris-labs-rust-engineer")
        );
    }

    #[test]
    fn test_missing_sub_elements_stay_empty() {
        let config = RenderedBoardConfig::default();
        let items = extract_listings(&page(&[BARE_ITEM]), &config, &quiet_politeness()).unwrap();
        let raw = items.into_iter().next().unwrap().unwrap();
        assert_eq!(raw, RawListing::default());
    }

    #[test]
    fn test_cap_applies_before_extraction() {
        let config = RenderedBoardConfig::default();
        let politeness = Politeness::new(PolitenessConfig {
            min_delay: std::time::Duration::ZERO,
            max_delay: std::time::Duration::ZERO,
            max_jobs_per_site: 3,
        })
        .unwrap();
        let html = page(&[FULL_ITEM; 8]);
        assert_eq!(extract_listings(&html, &config, &politeness).unwrap().len(), 3);
    }

    #[test]
    fn test_absolute_link_kept() {
        let config = RenderedBoardConfig::default();
        let item =
            r#"<li data-test-id="job-list-item"><a href="https://jobs.example.com/42">x</a></li>"#;
        let items = extract_listings(&page(&[item]), &config, &quiet_politeness()).unwrap();
        let raw = items.into_iter().next().unwrap().unwrap();
        assert_eq!(raw.link.as_deref(), Some("https://jobs.example.com/42"));
    }

    #[test]
    fn test_bad_selector_fails_adapter() {
        let config = RenderedBoardConfig {
            title_selector: "[[[".to_string(),
            ..RenderedBoardConfig::default()
        };
        assert!(matches!(
            extract_listings(&page(&[FULL_ITEM]), &config, &quiet_politeness()),
            Err(AdapterError::Selector(_))
        ));
    }

    async fn discover_with(
        renderer: Option<FixtureRenderer>,
        request: &DiscoveryRequest,
    ) -> Vec<JobRecord> {
        let backends = Backends::new(
            renderer.map(|r| Arc::new(r) as Arc<dyn crate::discovery::fetch::PageRenderer>),
            None,
        );
        let politeness = quiet_politeness();
        let clock = RunClock::new();
        let fallbacks = default_pools();
        let ctx = AdapterContext {
            backends: &backends,
            politeness: &politeness,
            clock: &clock,
            fallbacks: &fallbacks,
            id_scheme: JobIdScheme::Timestamped,
        };
        RenderedBoardAdapter::new(RenderedBoardConfig::default())
            .discover(request, &ctx)
            .await
    }

    #[tokio::test]
    async fn test_discover_normalizes_listings() {
        let config = RenderedBoardConfig::default();
        let renderer =
            FixtureRenderer::new().with_page(&config.listing_url, &justjoinit_listing(4));
        let jobs = discover_with(Some(renderer), &DiscoveryRequest::default()).await;

        assert_eq!(jobs.len(), 4);
        assert!(jobs.iter().all(|j| j.source == "JustJoinIT"));
        assert_eq!(jobs[0].title, "Rust Engineer 1");
        assert_eq!(jobs[0].job_type, JobType::FullTime);
        assert!(jobs[0].description.contains("Company 1"));
        assert_eq!(jobs[0].requirements.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_marker_serves_fallback() {
        let config = RenderedBoardConfig::default();
        let renderer =
            FixtureRenderer::new().with_page(&config.listing_url, "<html><body></body></html>");
        let jobs = discover_with(Some(renderer), &DiscoveryRequest::default()).await;

        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.source == "JustJoinIT"));
        assert!(jobs.iter().all(|j| j.job_id.starts_with("justjoinit_fallback_")));
    }

    #[tokio::test]
    async fn test_unavailable_browser_serves_fallback() {
        let jobs = discover_with(None, &DiscoveryRequest::default()).await;
        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["JavaScript Developer", "Python Developer"]);
    }

    #[tokio::test]
    async fn test_location_filter_is_soft() {
        let config = RenderedBoardConfig::default();
        let renderer =
            FixtureRenderer::new().with_page(&config.listing_url, &justjoinit_listing(4));
        let request = DiscoveryRequest {
            locations: vec!["remote".to_string()],
            ..DiscoveryRequest::default()
        };
        let jobs = discover_with(Some(renderer), &request).await;
        // Even ordinals in the fixture are remote.
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.location == "Remote"));

        let renderer =
            FixtureRenderer::new().with_page(&config.listing_url, &justjoinit_listing(4));
        let request = DiscoveryRequest {
            locations: vec!["Lisbon".to_string()],
            ..DiscoveryRequest::default()
        };
        assert_eq!(discover_with(Some(renderer), &request).await.len(), 4);
    }
}
