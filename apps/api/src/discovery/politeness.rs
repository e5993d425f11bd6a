//! Self-imposed rate limiting toward scraped sites.
//!
//! The only volume controls are a jittered delay between requests and a hard
//! per-site cap on listings. There is no per-domain backoff.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolitenessConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_jobs_per_site: usize,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(5),
            max_jobs_per_site: 50,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolitenessError {
    #[error("min_delay ({min:?}) exceeds max_delay ({max:?})")]
    InvertedRange { min: Duration, max: Duration },

    #[error("max_jobs_per_site must be at least 1")]
    ZeroCap,
}

#[derive(Debug, Clone)]
pub struct Politeness {
    config: PolitenessConfig,
}

impl Politeness {
    pub fn new(config: PolitenessConfig) -> Result<Self, PolitenessError> {
        if config.min_delay > config.max_delay {
            return Err(PolitenessError::InvertedRange {
                min: config.min_delay,
                max: config.max_delay,
            });
        }
        if config.max_jobs_per_site == 0 {
            return Err(PolitenessError::ZeroCap);
        }
        Ok(Self { config })
    }

    /// Draws a delay uniformly from `[min_delay, max_delay]`, millisecond resolution.
    pub fn sample_delay(&self) -> Duration {
        let min = millis(self.config.min_delay);
        let max = millis(self.config.max_delay);
        Duration::from_millis(fastrand::u64(min..=max))
    }

    pub async fn delay(&self) {
        let delay = self.sample_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Politeness delay");
        tokio::time::sleep(delay).await;
    }

    /// Truncates a batch of listings to the per-site cap.
    pub fn cap<T>(&self, mut items: Vec<T>) -> Vec<T> {
        items.truncate(self.config.max_jobs_per_site);
        items
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
