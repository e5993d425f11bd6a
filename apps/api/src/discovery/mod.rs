//! Job discovery: site adapters, fetch backends and the run orchestrator.

pub mod adapters;
pub mod browser;
pub mod catalog;
pub mod fallback;
pub mod fetch;
pub mod handlers;
pub mod http;
pub mod normalizer;
pub mod orchestrator;
pub mod politeness;
pub mod store;

#[cfg(test)]
pub mod testing;

use crate::discovery::adapters::career_pages::CareerPagesConfig;
use crate::discovery::adapters::rendered_board::RenderedBoardConfig;
use crate::discovery::adapters::static_board::StaticBoardConfig;
use crate::discovery::fallback::{default_pools, FallbackPools};
use crate::discovery::fetch::FetchConfig;
use crate::discovery::normalizer::JobIdScheme;
use crate::discovery::politeness::PolitenessConfig;

/// Everything a discovery run needs that is not per-request: timing, backend
/// settings, per-site fixture data and fallback pools.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub politeness: PolitenessConfig,
    pub fetch: FetchConfig,
    pub rendered_board: RenderedBoardConfig,
    pub static_board: StaticBoardConfig,
    pub career_pages: CareerPagesConfig,
    pub fallbacks: FallbackPools,
    pub id_scheme: JobIdScheme,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            politeness: PolitenessConfig::default(),
            fetch: FetchConfig::default(),
            rendered_board: RenderedBoardConfig::default(),
            static_board: StaticBoardConfig::default(),
            career_pages: CareerPagesConfig::default(),
            fallbacks: default_pools(),
            id_scheme: JobIdScheme::default(),
        }
    }
}
