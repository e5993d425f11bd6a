mod config;
mod db;
mod discovery;
mod errors;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::discovery::orchestrator::Orchestrator;
use crate::discovery::store::PgJobStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobScout v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    let politeness = &config.discovery.politeness;
    info!(
        "Discovery politeness: {}-{}ms delay, {} jobs per site, {:?} ids",
        politeness.min_delay.as_millis(),
        politeness.max_delay.as_millis(),
        politeness.max_jobs_per_site,
        config.discovery.id_scheme
    );
    let discovery =
        Orchestrator::new(config.discovery.clone()).context("Invalid discovery configuration")?;
    info!("Discovery sources: {}", discovery.known_sources().join(", "));

    // Build app state
    let shutdown = CancellationToken::new();
    let state = AppState {
        store: Arc::new(PgJobStore::new(db)),
        discovery: Arc::new(discovery),
        shutdown: shutdown.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        // TODO: restrict origins once the web client has a fixed host
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C and cancels in-flight discovery runs.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested; cancelling discovery runs");
    shutdown.cancel();
}
