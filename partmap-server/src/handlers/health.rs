//! Health check and dashboard status handlers
//!
//! Provides health and readiness endpoints for monitoring and orchestration,
//! plus the dashboard counters the review UI polls.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::StatusCounts;
use crate::error::ApiError;
use crate::state::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status: "healthy" or "degraded"
    #[schema(example = "healthy")]
    pub status: &'static str,
    /// Server version from Cargo.toml
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// Service name
    pub service: &'static str,
    /// Whether a parts database connection was established
    pub parts_database_connected: bool,
    /// Whether the file tracking store is configured
    pub file_tracking_connected: bool,
    /// Interchange mappings currently cached
    #[schema(example = 18432)]
    pub cache_mappings: usize,
}

/// GET /health - Health check endpoint
///
/// Returns JSON with service status and dependency availability. The
/// service stays up without its databases (resolution degrades to
/// extraction-only), so missing dependencies report "degraded", not an
/// error status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let parts_database_connected = state.parts_db.is_some();
    let file_tracking_connected = state.file_repo.is_some();

    let status = if parts_database_connected {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        service: "partmap-server",
        parts_database_connected,
        file_tracking_connected,
        cache_mappings: state.resolver.cached_mappings(),
    })
}

/// Readiness response for Kubernetes
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
}

/// GET /ready - Kubernetes readiness probe
///
/// Returns 200 once the router is serving. Unlike /health, this is a
/// simple yes/no check.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service readiness", body = ReadyResponse)
    )
)]
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}

/// Dashboard status response
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    /// Per-status file counters
    pub files: StatusCounts,
    /// Whether a parts database connection was established
    pub parts_database_connected: bool,
    /// Interchange mappings currently cached
    pub cache_mappings: usize,
    /// Server time of this snapshot
    #[schema(example = "2026-08-01T10:00:00Z")]
    pub timestamp: String,
}

/// GET /status - Dashboard counters
///
/// Snapshot of the processing pipeline for the review dashboard.
#[utoipa::path(
    get,
    path = "/status",
    tag = "Health",
    responses(
        (status = 200, description = "Pipeline status snapshot", body = StatusResponse),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn status_handler(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let repo = state
        .file_repo
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("File tracking not configured"))?;

    let files = repo.counts().await?;

    Ok(Json(StatusResponse {
        files,
        parts_database_connected: state.parts_db.is_some(),
        cache_mappings: state.resolver.cached_mappings(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}
