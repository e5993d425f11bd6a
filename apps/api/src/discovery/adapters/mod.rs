//! Site adapters: one extraction strategy per job source.
//!
//! An adapter's `scrape` may fail or come back empty; `discover` is the
//! boundary that turns both outcomes into the source's fallback pool, so
//! nothing an adapter does can fail a discovery run.

pub mod career_pages;
pub mod rendered_board;
pub mod static_board;

use async_trait::async_trait;
use scraper::{ElementRef, Selector};
use thiserror::Error;
use tracing::{info, warn};

use crate::discovery::fallback::FallbackPools;
use crate::discovery::fetch::{Backends, FetchError};
use crate::discovery::normalizer::{JobIdScheme, RawListing, RunClock};
use crate::discovery::politeness::Politeness;
use crate::models::job::{DiscoveryRequest, JobRecord};

/// A single listing could not be read. The listing is skipped.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("listing {index}: cannot resolve link `{href}`: {source}")]
    BadLink {
        index: usize,
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("company entry {index}: cannot derive a company name from `{url}`")]
    UnnamedCompany { index: usize, url: String },
}

/// The whole adapter failed. The source's fallback pool is served instead.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid CSS selector `{0}`")]
    Selector(String),

    #[error("invalid base URL `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Shared, read-only state of the run an adapter executes in.
pub struct AdapterContext<'a> {
    pub backends: &'a Backends,
    pub politeness: &'a Politeness,
    pub clock: &'a RunClock,
    pub fallbacks: &'a FallbackPools,
    pub id_scheme: JobIdScheme,
}

#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Stable identifier used in requests and the source catalog.
    fn id(&self) -> &'static str;

    /// Display name written into `JobRecord::source`.
    fn source_name(&self) -> &str;

    /// Primary extraction path.
    async fn scrape(
        &self,
        request: &DiscoveryRequest,
        ctx: &AdapterContext<'_>,
    ) -> Result<Vec<JobRecord>, AdapterError>;

    fn fallback(&self, ctx: &AdapterContext<'_>) -> Vec<JobRecord> {
        ctx.fallbacks
            .fallback_for(self.id(), self.source_name(), ctx.clock, ctx.id_scheme)
    }

    /// Runs `scrape`, substituting the fallback pool on failure or an empty result.
    async fn discover(
        &self,
        request: &DiscoveryRequest,
        ctx: &AdapterContext<'_>,
    ) -> Vec<JobRecord> {
        match self.scrape(request, ctx).await {
            Ok(jobs) if !jobs.is_empty() => {
                info!(source = self.id(), count = jobs.len(), "Scraped listings");
                jobs
            }
            Ok(_) => {
                let jobs = self.fallback(ctx);
                warn!(
                    source = self.id(),
                    fallback = jobs.len(),
                    "No listings extracted; serving fallback listings"
                );
                jobs
            }
            Err(e) => {
                let jobs = self.fallback(ctx);
                warn!(
                    source = self.id(),
                    error = %e,
                    fallback = jobs.len(),
                    "Adapter failed; serving fallback listings"
                );
                jobs
            }
        }
    }
}

/// Keeps the listings that extracted cleanly and logs the rest.
pub fn collect_listings(
    source_id: &str,
    items: Vec<Result<RawListing, ExtractionError>>,
) -> Vec<RawListing> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(source = source_id, error = %e, "Skipping listing");
                None
            }
        })
        .collect()
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, AdapterError> {
    Selector::parse(css).map_err(|_| AdapterError::Selector(css.to_string()))
}

/// Text content of an element with runs of whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Narrows `jobs` to those whose field contains one of `needles`
/// (case-insensitive). A filter that would drop everything is ignored.
pub(crate) fn soft_filter<F>(jobs: Vec<JobRecord>, needles: &[String], field: F) -> Vec<JobRecord>
where
    F: Fn(&JobRecord) -> &str,
{
    let needles: Vec<String> = needles
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();
    if needles.is_empty() {
        return jobs;
    }

    let (kept, dropped): (Vec<_>, Vec<_>) = jobs.into_iter().partition(|job| {
        let value = field(job).to_lowercase();
        needles.iter().any(|n| value.contains(n.as_str()))
    });

    if kept.is_empty() {
        dropped
    } else {
        kept
    }
}
