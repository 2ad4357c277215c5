//! HTTP surface.
//!
//! A thin axum app over the orchestrator: a build trigger, a store
//! connectivity probe, and hostname-based serving of published tenant
//! sites. Requests whose Host header carries a tenant subdomain are
//! answered straight from the bucket and never reach the API routes.

pub mod tenant;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::core::{Orchestrator, PipelineError};
use crate::store::{ObjectStore, StoreError, PROBE_PREFIX};
use crate::transfer::content_type_for;

/// Shared application state.
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub orchestrator: Orchestrator,
    /// Artifact sub-namespace; tenant requests are served from
    /// `{tenant}/{output_dir}/...`.
    pub output_dir: String,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/build", post(build))
        // Registered before the tenant layer so that arbitrary tenant-site
        // paths still pass through the gate instead of axum's default 404.
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            tenant_gate,
        ))
        .with_state(state)
}

/// Run the HTTP server until shutdown.
pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root() -> &'static str {
    "siteforge is running\n"
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Store connectivity probe.
async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list(PROBE_PREFIX).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(err) => {
            error!(error = %err, "store connectivity check failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": "error", "message": err.to_string() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildRequest {
    #[serde(default)]
    project_name: String,
}

/// Trigger one build pipeline run.
///
/// The response distinguishes validation errors (400) from pipeline
/// failures (500) and reports a human-readable category, never internal
/// paths.
async fn build(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BuildRequest>,
) -> Response {
    match state.orchestrator.run(&request.project_name).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "message": "build and publish successful",
                "projectName": report.project,
                "runId": report.run_id,
                "filesPublished": report.files_published,
            })),
        )
            .into_response(),
        Err(err @ PipelineError::InvalidProject { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": err.to_string() })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}

/// Serve published tenant sites by subdomain before the API routes see the
/// request. The `api` subdomain is reserved for the API itself.
async fn tenant_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let Some(tenant) = tenant::subdomain(host) else {
        return next.run(request).await;
    };
    if tenant == "api" {
        return next.run(request).await;
    }

    let mut path = request.uri().path().to_string();
    if path.ends_with('/') {
        path.push_str("index.html");
    }
    let key = format!("{}/{}{}", tenant, state.output_dir, path);

    info!(%tenant, %key, "serving tenant asset");

    match state.store.get(&key).await {
        Ok(body) => {
            let content_type = body
                .content_type
                .unwrap_or_else(|| content_type_for(Path::new(&key)).to_string());
            ([(header::CONTENT_TYPE, content_type)], body.bytes).into_response()
        }
        Err(StoreError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(err) => {
            error!(error = %err, %key, "failed to serve tenant asset");
            (StatusCode::BAD_GATEWAY, "upstream storage error").into_response()
        }
    }
}
