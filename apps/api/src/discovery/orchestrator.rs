//! Runs a discovery request across the selected adapters.
//!
//! One run owns one set of backends. Adapters execute one after another with a
//! politeness delay in between, and the run can be cancelled before any
//! adapter starts. Adapter failures never surface here: each adapter already
//! substitutes its fallback pool.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::discovery::adapters::career_pages::{CareerPagesAdapter, SOURCE_ALIAS};
use crate::discovery::adapters::rendered_board::RenderedBoardAdapter;
use crate::discovery::adapters::static_board::StaticBoardAdapter;
use crate::discovery::adapters::{career_pages, AdapterContext, SiteAdapter};
use crate::discovery::fallback::FallbackPools;
use crate::discovery::fetch::{BackendFactory, Backends, LiveBackends};
use crate::discovery::normalizer::{JobIdScheme, RunClock};
use crate::discovery::politeness::{Politeness, PolitenessError};
use crate::discovery::DiscoveryConfig;
use crate::models::job::{DiscoveryRequest, DiscoveryResult, JobRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Initializing,
    Running(&'static str),
    Aggregating,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Initializing => write!(f, "initializing"),
            RunPhase::Running(source) => write!(f, "running:{source}"),
            RunPhase::Aggregating => write!(f, "aggregating"),
            RunPhase::Done => write!(f, "done"),
        }
    }
}

fn enter(phase: &mut RunPhase, next: RunPhase) {
    debug!(from = %phase, to = %next, "Run phase");
    *phase = next;
}

pub struct Orchestrator {
    adapters: Vec<Box<dyn SiteAdapter>>,
    backends: Arc<dyn BackendFactory>,
    politeness: Politeness,
    fallbacks: FallbackPools,
    id_scheme: JobIdScheme,
}

impl Orchestrator {
    /// Builds the three built-in adapters over live backends.
    pub fn new(config: DiscoveryConfig) -> Result<Self, PolitenessError> {
        let politeness = Politeness::new(config.politeness)?;
        Ok(Self::with_parts(
            vec![
                Box::new(RenderedBoardAdapter::new(config.rendered_board)),
                Box::new(StaticBoardAdapter::new(config.static_board)),
                Box::new(CareerPagesAdapter::new(config.career_pages)),
            ],
            Arc::new(LiveBackends::new(config.fetch)),
            politeness,
            config.fallbacks,
            config.id_scheme,
        ))
    }

    pub fn with_parts(
        adapters: Vec<Box<dyn SiteAdapter>>,
        backends: Arc<dyn BackendFactory>,
        politeness: Politeness,
        fallbacks: FallbackPools,
        id_scheme: JobIdScheme,
    ) -> Self {
        Self {
            adapters,
            backends,
            politeness,
            fallbacks,
            id_scheme,
        }
    }

    /// Adapter ids in default execution order.
    pub fn known_sources(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.id()).collect()
    }

    /// Selects adapters for the requested ids, in request order. Unknown ids
    /// are logged and skipped; repeated ids run once. No ids means all adapters.
    fn plan(&self, requested: &[String]) -> Vec<&dyn SiteAdapter> {
        if requested.is_empty() {
            return self.adapters.iter().map(|a| a.as_ref()).collect();
        }

        let mut seen = HashSet::new();
        let mut plan = Vec::new();
        for raw in requested {
            let id = canonical_source_id(raw);
            match self.adapters.iter().find(|a| a.id() == id) {
                Some(adapter) if seen.insert(adapter.id()) => plan.push(adapter.as_ref()),
                Some(_) => debug!(source = %id, "Source requested twice; running once"),
                None => warn!(source = %raw, "Unknown source requested; skipping"),
            }
        }
        plan
    }

    /// Initializes fresh backends, runs the request and releases the backends.
    pub async fn discover(
        &self,
        request: &DiscoveryRequest,
        cancel: &CancellationToken,
    ) -> DiscoveryResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("discovery", run_id = %run_id);
        async {
            let mut phase = RunPhase::Idle;
            enter(&mut phase, RunPhase::Initializing);
            let backends = self.backends.initialize().await;
            if backends.is_empty() {
                error!(
                    "No fetch backend could be initialized; every source will serve fallback listings"
                );
            }
            self.run(run_id, request, &backends, cancel, phase).await
        }
        .instrument(span)
        .await
    }

    /// Runs the request over a caller-provided set of backends.
    #[cfg(test)]
    pub async fn discover_with(
        &self,
        request: &DiscoveryRequest,
        backends: &Backends,
        cancel: &CancellationToken,
    ) -> DiscoveryResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("discovery", run_id = %run_id);
        self.run(run_id, request, backends, cancel, RunPhase::Idle)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        run_id: Uuid,
        request: &DiscoveryRequest,
        backends: &Backends,
        cancel: &CancellationToken,
        mut phase: RunPhase,
    ) -> DiscoveryResult {
        let plan = self.plan(&request.sources);
        info!(
            sources = ?plan.iter().map(|a| a.id()).collect::<Vec<_>>(),
            "Starting discovery run"
        );

        let clock = RunClock::new();
        let ctx = AdapterContext {
            backends,
            politeness: &self.politeness,
            clock: &clock,
            fallbacks: &self.fallbacks,
            id_scheme: self.id_scheme,
        };

        let mut sources_scraped = Vec::with_capacity(plan.len());
        let mut jobs = Vec::new();
        for (i, adapter) in plan.iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = self.politeness.delay() => {}
                }
            }
            if cancel.is_cancelled() {
                warn!(
                    completed = sources_scraped.len(),
                    remaining = plan.len() - i,
                    "Discovery run cancelled"
                );
                break;
            }

            enter(&mut phase, RunPhase::Running(adapter.id()));
            let batch = adapter.discover(request, &ctx).await;
            info!(source = adapter.id(), count = batch.len(), "Source finished");
            sources_scraped.push(adapter.id().to_string());
            jobs.extend(batch);
        }

        enter(&mut phase, RunPhase::Aggregating);
        let jobs = disambiguate_ids(jobs);
        enter(&mut phase, RunPhase::Done);

        info!(jobs_found = jobs.len(), "Discovery run complete");
        DiscoveryResult {
            run_id,
            jobs_found: jobs.len(),
            jobs,
            sources_scraped,
            timestamp: Utc::now(),
        }
    }
}

/// Lowercased, trimmed adapter id with aliases resolved.
pub fn canonical_source_id(raw: &str) -> String {
    let id = raw.trim().to_lowercase();
    if id == SOURCE_ALIAS {
        career_pages::SOURCE_ID.to_string()
    } else {
        id
    }
}

/// Appends `-2`, `-3`, ... to repeated job ids, keeping the first occurrence as is.
fn disambiguate_ids(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(jobs.len());
    jobs.into_iter()
        .map(|mut job| {
            if !seen.insert(job.job_id.clone()) {
                let base = job.job_id.clone();
                let mut n = 2;
                while !seen.insert(format!("{base}-{n}")) {
                    n += 1;
                }
                job.job_id = format!("{base}-{n}");
            }
            job
        })
        .collect()
}
