//! Axum route handlers for the discovery API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::discovery::catalog;
use crate::errors::AppError;
use crate::models::job::{DiscoveryRequest, JobRecord};
use crate::models::source::SourceInfo;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub success: bool,
    pub jobs_found: usize,
    pub jobs: Vec<JobRecord>,
    pub sources_scraped: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub run_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub source: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub success: bool,
    pub jobs: Vec<JobRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub sources: Vec<SourceInfo>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub jobs_found: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/discover/jobs
///
/// Runs a discovery over the requested sources. When `user_id` is set the
/// batch is stored for that user before responding.
pub async fn handle_discover_jobs(
    State(state): State<AppState>,
    Json(request): Json<DiscoveryRequest>,
) -> Result<Json<DiscoverResponse>, AppError> {
    let cancel = state.shutdown.child_token();
    let result = state.discovery.discover(&request, &cancel).await;

    if let Some(user_id) = request.user_id.as_deref().filter(|u| !u.trim().is_empty()) {
        let inserted = state.store.upsert_jobs(user_id, &result.jobs).await?;
        info!(run_id = %result.run_id, inserted, "Persisted discovered jobs for user {user_id}");
    }

    Ok(Json(DiscoverResponse {
        success: true,
        jobs_found: result.jobs_found,
        jobs: result.jobs,
        sources_scraped: result.sources_scraped,
        timestamp: result.timestamp,
        run_id: result.run_id,
    }))
}

/// GET /api/discover/jobs/:user_id?source=&limit=
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<ListJobsResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit < 1 {
        return Err(AppError::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }
    let limit = limit.min(MAX_LIST_LIMIT);
    // Catalog names map to adapter ids; anything else matches display names.
    let source = query
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| catalog::source_id_for(s).unwrap_or(s));

    let jobs = state.store.list_jobs(&user_id, source, limit).await?;

    Ok(Json(ListJobsResponse {
        success: true,
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/discover/sources
pub async fn handle_list_sources() -> Json<SourcesResponse> {
    Json(SourcesResponse {
        sources: catalog::sources(),
    })
}

/// POST /api/discover/refresh-jobs?user_id=
///
/// Re-runs discovery over every source and stores the result for the user.
pub async fn handle_refresh_jobs(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<RefreshResponse>, AppError> {
    if query.user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id cannot be empty".to_string()));
    }

    let cancel = state.shutdown.child_token();
    let request = DiscoveryRequest {
        user_id: Some(query.user_id.clone()),
        ..DiscoveryRequest::default()
    };
    let result = state.discovery.discover(&request, &cancel).await;
    let inserted = state.store.upsert_jobs(&query.user_id, &result.jobs).await?;
    info!(run_id = %result.run_id, inserted, "Refreshed jobs for user {}", query.user_id);

    Ok(Json(RefreshResponse {
        success: true,
        message: format!("Discovered {} jobs", result.jobs_found),
        jobs_found: result.jobs_found,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use crate::discovery::adapters::career_pages::{CareerPagesAdapter, CareerPagesConfig};
    use crate::discovery::adapters::rendered_board::{RenderedBoardAdapter, RenderedBoardConfig};
    use crate::discovery::adapters::static_board::{StaticBoardAdapter, StaticBoardConfig};
    use crate::discovery::fallback::default_pools;
    use crate::discovery::normalizer::JobIdScheme;
    use crate::discovery::orchestrator::Orchestrator;
    use crate::discovery::store::{JobStore, MemoryJobStore};
    use crate::discovery::testing::{quiet_politeness, sample_job, FixtureBackends};
    use crate::routes::build_router;
    use crate::state::AppState;

    fn app_state(store: Arc<MemoryJobStore>) -> AppState {
        let discovery = Orchestrator::with_parts(
            vec![
                Box::new(RenderedBoardAdapter::new(RenderedBoardConfig::default())),
                Box::new(StaticBoardAdapter::new(StaticBoardConfig::default())),
                Box::new(CareerPagesAdapter::new(CareerPagesConfig::default())),
            ],
            Arc::new(FixtureBackends::new(None, None)),
            quiet_politeness(),
            default_pools(),
            JobIdScheme::ContentHash,
        );
        AppState {
            store,
            discovery: Arc::new(discovery),
            shutdown: CancellationToken::new(),
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_discover_returns_run_summary() {
        let state = app_state(Arc::new(MemoryJobStore::new()));
        let (status, body) = send(
            state,
            post_json("/api/discover/jobs", json!({"sources": ["careerpages"]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["jobs_found"], 9);
        assert_eq!(body["sources_scraped"], json!(["careerpages"]));
        assert_eq!(body["jobs"][0]["job_type"], "full-time");
        assert!(body["run_id"].is_string());
    }

    #[tokio::test]
    async fn test_discover_with_user_persists_once() {
        let store = Arc::new(MemoryJobStore::new());
        let request = json!({"user_id": "user-1", "sources": ["careerpages"]});

        send(app_state(store.clone()), post_json("/api/discover/jobs", request.clone())).await;
        send(app_state(store.clone()), post_json("/api/discover/jobs", request)).await;

        assert_eq!(store.list_jobs("user-1", None, 200).await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_list_jobs_applies_source_and_limit() {
        let store = Arc::new(MemoryJobStore::new());
        let mut inhire = sample_job("inhire_0_1", "Developer Position 1", "Europe");
        inhire.source = "InHire".to_string();
        inhire.source_id = "inhire".to_string();
        store
            .upsert_jobs(
                "user-1",
                &[
                    sample_job("justjoinit_0_1", "Rust Engineer", "Remote"),
                    sample_job("justjoinit_1_1", "Go Engineer", "Remote"),
                    inhire,
                ],
            )
            .await
            .unwrap();

        let (status, body) = send(
            app_state(store.clone()),
            get("/api/discover/jobs/user-1?source=InHire"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["jobs"][0]["job_id"], "inhire_0_1");

        let (_, body) = send(app_state(store), get("/api/discover/jobs/user-1?limit=2")).await;
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn test_list_jobs_by_catalog_name_finds_career_records() {
        let store = Arc::new(MemoryJobStore::new());
        send(
            app_state(store.clone()),
            post_json(
                "/api/discover/jobs",
                json!({"user_id": "user-1", "sources": ["careerpages"]}),
            ),
        )
        .await;

        let (status, body) = send(
            app_state(store),
            get("/api/discover/jobs/user-1?source=Career%20Pages"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 9);
        assert_eq!(body["jobs"][0]["source_id"], "careerpages");
    }

    #[tokio::test]
    async fn test_list_jobs_rejects_zero_limit() {
        let state = app_state(Arc::new(MemoryJobStore::new()));
        let (status, body) = send(state, get("/api/discover/jobs/user-1?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_sources_lists_catalog() {
        let state = app_state(Arc::new(MemoryJobStore::new()));
        let (status, body) = send(state, get("/api/discover/sources")).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["sources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["justjoinit", "inhire", "careerpages"]);
    }

    #[tokio::test]
    async fn test_refresh_runs_every_source_and_stores() {
        let store = Arc::new(MemoryJobStore::new());
        let (status, body) = send(
            app_state(store.clone()),
            Request::post("/api/discover/refresh-jobs?user_id=user-7")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        // No backends: 2 rendered-board fallbacks, 1 static-board fallback, 9 career records.
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["jobs_found"], 12);
        assert_eq!(store.list_jobs("user-7", None, 200).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_health() {
        let state = app_state(Arc::new(MemoryJobStore::new()));
        let (status, body) = send(state, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "jobscout");
    }
}
