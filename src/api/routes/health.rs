//! Health Routes
//!
//! Health check endpoints for the service manager and for debugging the
//! panel from a browser.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (some hardware is present)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no hardware checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 when at least one panel device opened.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.hardware.any_present() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with device and state details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let overall_status = if state.hardware.is_complete() {
        "healthy"
    } else if state.hardware.any_present() {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        connections: state.ws_connection_count().await,
        hardware: state.hardware.clone(),
        state: state.portal.snapshot().await,
    })
}
