//! Retrieval primitives shared by every site adapter.
//!
//! Two backends exist: a headless browser for JavaScript-rendered boards and a
//! plain HTTP client for server-rendered pages. Either may be missing after
//! initialization; adapters ask for the one they need and get a
//! `FetchError::BackendUnavailable` instead of a panic when it is absent.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::discovery::browser::ChromeRenderer;
use crate::discovery::http::HttpFetcher;

/// Desktop user agents rotated per session. Cosmetic only.
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

pub fn pick_user_agent() -> &'static str {
    USER_AGENTS[fastrand::usize(..USER_AGENTS.len())]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Browser,
    Http,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Browser => write!(f, "browser"),
            BackendKind::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: BackendKind, reason: String },

    #[error("request to {url} timed out after {}s", .after.as_secs())]
    Timeout { url: String, after: Duration },

    #[error("timed out waiting for `{selector}` on {url}")]
    SelectorTimeout { url: String, selector: String },

    #[error("invalid CSS selector `{0}`")]
    InvalidSelector(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(String),
}

impl FetchError {
    pub fn unavailable(backend: BackendKind, reason: impl Into<String>) -> Self {
        FetchError::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }
}

/// DOM of a page after client-side rendering finished.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct StaticResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders `url` and returns its DOM once an element matching `wait_for` exists.
    async fn fetch_rendered(&self, url: &str, wait_for: &str) -> Result<RenderedPage, FetchError>;
}

#[async_trait]
pub trait StaticFetcher: Send + Sync {
    /// Plain GET. Non-2xx statuses are returned, not raised.
    async fn fetch_static(&self, url: &str) -> Result<StaticResponse, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Total timeout for one static fetch.
    pub static_timeout: Duration,
    /// Explicit wait for a dynamic element to appear in a rendered page.
    pub render_wait: Duration,
    /// Browser executable. Looked up on `PATH` when unset.
    pub chrome_bin: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            static_timeout: Duration::from_secs(30),
            render_wait: Duration::from_secs(10),
            chrome_bin: None,
        }
    }
}

/// The backends of one discovery run. Adapters borrow it read-only; dropping
/// it releases the browser profile and the HTTP connection pool.
pub struct Backends {
    renderer: Option<Arc<dyn PageRenderer>>,
    fetcher: Option<Arc<dyn StaticFetcher>>,
}

impl Backends {
    pub fn new(
        renderer: Option<Arc<dyn PageRenderer>>,
        fetcher: Option<Arc<dyn StaticFetcher>>,
    ) -> Self {
        Self { renderer, fetcher }
    }

    #[cfg(test)]
    pub fn none() -> Self {
        Self::new(None, None)
    }

    /// Brings up both backends. A backend that fails to start is logged and
    /// left out; this never fails as a whole.
    pub async fn initialize(config: &FetchConfig) -> Self {
        let renderer = match ChromeRenderer::launch(config).await {
            Ok(renderer) => Some(Arc::new(renderer) as Arc<dyn PageRenderer>),
            Err(e) => {
                warn!(
                    error = %e,
                    "Headless browser unavailable; rendered sources will use fallback listings"
                );
                None
            }
        };

        let fetcher = match HttpFetcher::new(config) {
            Ok(fetcher) => Some(Arc::new(fetcher) as Arc<dyn StaticFetcher>),
            Err(e) => {
                warn!(
                    error = %e,
                    "HTTP client unavailable; static sources will use fallback listings"
                );
                None
            }
        };

        info!(
            browser = renderer.is_some(),
            http = fetcher.is_some(),
            "Fetch backends initialized"
        );

        Self { renderer, fetcher }
    }

    pub fn renderer(&self) -> Result<&dyn PageRenderer, FetchError> {
        self.renderer
            .as_deref()
            .ok_or_else(|| FetchError::unavailable(BackendKind::Browser, "not initialized"))
    }

    pub fn fetcher(&self) -> Result<&dyn StaticFetcher, FetchError> {
        self.fetcher
            .as_deref()
            .ok_or_else(|| FetchError::unavailable(BackendKind::Http, "not initialized"))
    }

    pub fn is_empty(&self) -> bool {
        self.renderer.is_none() && self.fetcher.is_none()
    }
}

/// Produces a fresh set of backends for each discovery run.
#[async_trait]
pub trait BackendFactory: Send + Sync {
    async fn initialize(&self) -> Backends;
}

/// Launches a real browser and HTTP client.
pub struct LiveBackends {
    config: FetchConfig,
}

impl LiveBackends {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BackendFactory for LiveBackends {
    async fn initialize(&self) -> Backends {
        Backends::initialize(&self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_comes_from_pool() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&pick_user_agent()));
        }
    }

    #[test]
    fn test_missing_backends_report_unavailable() {
        let backends = Backends::none();
        assert!(backends.is_empty());
        assert!(matches!(
            backends.renderer(),
            Err(FetchError::BackendUnavailable {
                backend: BackendKind::Browser,
                ..
            })
        ));
        assert!(matches!(
            backends.fetcher(),
            Err(FetchError::BackendUnavailable {
                backend: BackendKind::Http,
                ..
            })
        ));
    }

    #[test]
    fn test_timeout_message_reports_seconds() {
        let err = FetchError::Timeout {
            url: "https://inhire.io/jobs".to_string(),
            after: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "request to https://inhire.io/jobs timed out after 30s"
        );
    }
}
