//! Status and health endpoints.
//!
//! # Endpoints
//!
//! - `GET /` - Service banner with the current timestamp
//! - `GET /health` - Liveness probe
//!
//! Neither endpoint is authenticated. Both return 200 whenever the process
//! is serving requests; there are no downstream dependencies to report on.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::models::{HealthResponse, StatusResponse};
use crate::state::AppState;

/// Root status endpoint.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "active",
///   "message": "GMass Webhook Server is running",
///   "timestamp": "2024-01-15T10:30:00.123456Z"
/// }
/// ```
#[instrument(skip(state))]
pub async fn root(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::active(&state.config.service_name))
}

/// Health check endpoint.
///
/// Always returns `{"status": "healthy"}`, regardless of request headers.
#[instrument]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
