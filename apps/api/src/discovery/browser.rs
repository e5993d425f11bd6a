//! Headless Chromium backend.
//!
//! Each render is one `--dump-dom` invocation against a profile directory
//! private to the session. The virtual-time budget lets client-side scripts
//! settle for the configured wait before the DOM is serialized.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tempfile::TempDir;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::discovery::fetch::{
    pick_user_agent, BackendKind, FetchConfig, FetchError, PageRenderer, RenderedPage,
};

const BROWSER_CANDIDATES: [&str; 4] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Headroom on top of the render wait for browser start-up and DOM serialization.
const RENDER_GRACE: Duration = Duration::from_secs(20);

pub struct ChromeRenderer {
    executable: PathBuf,
    user_agent: &'static str,
    wait: Duration,
    profile: TempDir,
}

impl ChromeRenderer {
    /// Locates the browser, verifies it starts and reserves a profile directory.
    pub async fn launch(config: &FetchConfig) -> Result<Self, FetchError> {
        let executable = locate_browser(config.chrome_bin.as_deref())?;

        let profile = tempfile::Builder::new()
            .prefix("jobscout-profile-")
            .tempdir()
            .map_err(|e| {
                FetchError::unavailable(BackendKind::Browser, format!("profile dir: {e}"))
            })?;

        let probe = Command::new(&executable)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(PROBE_TIMEOUT, probe).await {
            Ok(Ok(output)) if output.status.success() => output,
            Ok(Ok(output)) => {
                return Err(FetchError::unavailable(
                    BackendKind::Browser,
                    format!("version probe exited with {}", output.status),
                ))
            }
            Ok(Err(e)) => return Err(FetchError::unavailable(BackendKind::Browser, e.to_string())),
            Err(_) => {
                return Err(FetchError::unavailable(
                    BackendKind::Browser,
                    "version probe timed out",
                ))
            }
        };

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(
            browser = %executable.display(),
            version = %version,
            "Headless browser ready"
        );

        Ok(Self {
            executable,
            user_agent: pick_user_agent(),
            wait: config.render_wait,
            profile,
        })
    }

    fn render_args(&self, url: &str) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--hide-scrollbars".to_string(),
            "--window-size=1920,1080".to_string(),
            format!("--user-agent={}", self.user_agent),
            format!("--user-data-dir={}", self.profile.path().display()),
            format!("--virtual-time-budget={}", self.wait.as_millis()),
            "--dump-dom".to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn fetch_rendered(&self, url: &str, wait_for: &str) -> Result<RenderedPage, FetchError> {
        debug!(url = %url, wait_for = %wait_for, "Rendering page");

        let render = Command::new(&self.executable)
            .args(self.render_args(url))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let budget = self.wait + RENDER_GRACE;
        let output = timeout(budget, render)
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                after: budget,
            })?
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        if !output.status.success() {
            return Err(FetchError::Browser(format!(
                "browser exited with {} while rendering {url}",
                output.status
            )));
        }

        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        if !dom_contains(&html, wait_for)? {
            return Err(FetchError::SelectorTimeout {
                url: url.to_string(),
                selector: wait_for.to_string(),
            });
        }

        Ok(RenderedPage {
            url: url.to_string(),
            html,
        })
    }
}

/// Whether any element of `html` matches `selector`.
pub fn dom_contains(html: &str, selector: &str) -> Result<bool, FetchError> {
    let selector =
        Selector::parse(selector).map_err(|_| FetchError::InvalidSelector(selector.to_string()))?;
    let document = Html::parse_document(html);
    let found = document.select(&selector).next().is_some();
    Ok(found)
}

fn locate_browser(explicit: Option<&Path>) -> Result<PathBuf, FetchError> {
    if let Some(path) = explicit {
        return which::which(path).map_err(|e| {
            FetchError::unavailable(
                BackendKind::Browser,
                format!("{} is not executable: {e}", path.display()),
            )
        });
    }

    BROWSER_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            FetchError::unavailable(
                BackendKind::Browser,
                format!("none of {} found on PATH", BROWSER_CANDIDATES.join(", ")),
            )
        })
}
