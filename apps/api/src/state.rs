use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::discovery::orchestrator::Orchestrator;
use crate::discovery::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Discovered jobs per user. `PgJobStore` in production.
    pub store: Arc<dyn JobStore>,
    pub discovery: Arc<Orchestrator>,
    /// Cancelled on shutdown; each discovery run watches a child token.
    pub shutdown: CancellationToken,
}
