pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::discovery::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/discover/jobs", post(handlers::handle_discover_jobs))
        .route("/api/discover/jobs/:user_id", get(handlers::handle_list_jobs))
        .route("/api/discover/sources", get(handlers::handle_list_sources))
        .route(
            "/api/discover/refresh-jobs",
            post(handlers::handle_refresh_jobs),
        )
        .with_state(state)
}
