//! Canned-page backends and fixtures for discovery tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::discovery::browser::dom_contains;
use crate::discovery::fetch::{
    BackendFactory, Backends, FetchError, PageRenderer, RenderedPage, StaticFetcher,
    StaticResponse,
};
use crate::discovery::politeness::{Politeness, PolitenessConfig};
use crate::models::job::{JobRecord, JobType};

#[derive(Default)]
pub struct FixtureRenderer {
    pages: HashMap<String, String>,
}

impl FixtureRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageRenderer for FixtureRenderer {
    async fn fetch_rendered(&self, url: &str, wait_for: &str) -> Result<RenderedPage, FetchError> {
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| FetchError::Browser(format!("navigation to {url} failed")))?;
        if !dom_contains(html, wait_for)? {
            return Err(FetchError::SelectorTimeout {
                url: url.to_string(),
                selector: wait_for.to_string(),
            });
        }
        Ok(RenderedPage {
            url: url.to_string(),
            html: html.clone(),
        })
    }
}

#[derive(Default)]
pub struct FixtureFetcher {
    responses: HashMap<String, (u16, String)>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }
}

#[async_trait]
impl StaticFetcher for FixtureFetcher {
    async fn fetch_static(&self, url: &str) -> Result<StaticResponse, FetchError> {
        let (status, body) = self
            .responses
            .get(url)
            .cloned()
            .unwrap_or((404, String::new()));
        Ok(StaticResponse { status, body })
    }
}

/// Hands out the same fixtures for every run and counts initializations.
#[derive(Default)]
pub struct FixtureBackends {
    renderer: Option<Arc<FixtureRenderer>>,
    fetcher: Option<Arc<FixtureFetcher>>,
    initialized: AtomicUsize,
}

impl FixtureBackends {
    pub fn new(renderer: Option<FixtureRenderer>, fetcher: Option<FixtureFetcher>) -> Self {
        Self {
            renderer: renderer.map(Arc::new),
            fetcher: fetcher.map(Arc::new),
            initialized: AtomicUsize::new(0),
        }
    }

    pub fn initializations(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendFactory for FixtureBackends {
    async fn initialize(&self) -> Backends {
        self.initialized.fetch_add(1, Ordering::SeqCst);
        Backends::new(
            self.renderer
                .clone()
                .map(|r| r as Arc<dyn PageRenderer>),
            self.fetcher.clone().map(|f| f as Arc<dyn StaticFetcher>),
        )
    }
}

pub fn quiet_politeness() -> Politeness {
    Politeness::new(PolitenessConfig {
        min_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        max_jobs_per_site: 50,
    })
    .expect("zero delays are a valid range")
}

/// A rendered board page with `n` complete listings. Even-numbered listings are remote.
pub fn justjoinit_listing(n: usize) -> String {
    let items: String = (1..=n)
        .map(|i| {
            let location = if i % 2 == 0 { "Remote" } else { "Warsaw, Poland" };
            format!(
                r#"<li data-test-id="job-list-item"><a href="/offers/{i}">
                     <h3 data-test-id="job-list-item-title">Rust Engineer {i}</h3>
                     <span data-test-id="job-list-item-company">Company {i}</span>
                     <span data-test-id="job-list-item-location">{location}</span>
                     <span data-test-id="job-list-item-salary">Competitive</span>
                   </a></li>"#
            )
        })
        .collect();
    format!("<html><body><ul>{items}</ul></body></html>")
}

/// A static board page with `n` job containers.
pub fn inhire_listing(n: usize) -> String {
    let items: String = (1..=n)
        .map(|i| {
            format!(
                r#"<article class="JobCard"><h2>Backend role {i}</h2><p>Build payment APIs in Kotlin.</p></article>"#
            )
        })
        .collect();
    format!(r#"<html><body><nav class="menu">Home</nav><main>{items}</main></body></html>"#)
}

pub fn sample_job(job_id: &str, title: &str, location: &str) -> JobRecord {
    let now = Utc::now();
    JobRecord {
        job_id: job_id.to_string(),
        title: title.to_string(),
        company: "Ferris Labs".to_string(),
        location: location.to_string(),
        description: "Build things.".to_string(),
        requirements: vec!["Rust".to_string()],
        salary_range: None,
        job_type: JobType::FullTime,
        source_url: "https://example.com".to_string(),
        source: "JustJoinIT".to_string(),
        source_id: "justjoinit".to_string(),
        posted_date: now,
        scraped_at: now,
    }
}
