use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use renderpod_core::generation::GenerationInput;

use crate::handler::{run_generation, JobOutput};
use crate::state::AppState;

/// One job invocation as delivered by the serverless host.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Caller-supplied generation parameters; every field optional.
    #[serde(default)]
    pub input: GenerationInput,
}

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the ComfyUI backend currently answers its stats endpoint.
    pub backend_healthy: bool,
}

/// POST /run -- execute one generation job.
///
/// Always returns 200 with either the success or the error payload;
/// internal failures never surface as transport-level faults.
async fn run(State(state): State<AppState>, Json(job): Json<RunRequest>) -> Json<JobOutput> {
    let cancel = CancellationToken::new();
    Json(run_generation(&state, job.input, &cancel).await)
}

/// GET /health -- returns service and backend health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend_healthy = state.api.system_stats().await.is_ok();

    let status = if backend_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        backend_healthy,
    })
}

/// Mount the worker's RPC routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(run))
        .route("/health", get(health_check))
}
