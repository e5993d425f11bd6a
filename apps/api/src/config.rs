use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::discovery::normalizer::JobIdScheme;
use crate::discovery::DiscoveryConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub discovery: DiscoveryConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut discovery = DiscoveryConfig::default();

        if let Some(ms) = parse_opt::<u64>(&lookup, "DISCOVERY_MIN_DELAY_MS")? {
            discovery.politeness.min_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_opt::<u64>(&lookup, "DISCOVERY_MAX_DELAY_MS")? {
            discovery.politeness.max_delay = Duration::from_millis(ms);
        }
        if let Some(cap) = parse_opt::<usize>(&lookup, "DISCOVERY_MAX_JOBS_PER_SITE")? {
            discovery.politeness.max_jobs_per_site = cap;
        }
        if let Some(secs) = parse_opt::<u64>(&lookup, "DISCOVERY_STATIC_TIMEOUT_SECS")? {
            discovery.fetch.static_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_opt::<u64>(&lookup, "DISCOVERY_RENDER_WAIT_SECS")? {
            discovery.fetch.render_wait = Duration::from_secs(secs);
        }
        discovery.fetch.chrome_bin = lookup("CHROME_BIN")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        if parse_opt::<bool>(&lookup, "DISCOVERY_STABLE_IDS")?.unwrap_or(false) {
            discovery.id_scheme = JobIdScheme::ContentHash;
        }

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .context("Required environment variable 'DATABASE_URL' is not set")?,
            port: parse_opt::<u16>(&lookup, "PORT")?.unwrap_or(8001),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            discovery,
        })
    }
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().with_context(|| {
                format!("Environment variable '{key}' has an invalid value: {raw}")
            })
        })
        .transpose()
}
