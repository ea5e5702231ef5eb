//! Probe endpoints for container orchestration.
//!
//! `/healthz` is the liveness probe: it only checks that the process can respond to
//! HTTP, so a database outage never gets a healthy process restarted. `/healthx` is
//! the readiness probe and fails while the document store is unreachable.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

pub const PROBE_OK: &str = "OK";
pub const PROBE_NOT_READY: &str = "NOT READY";

/// Liveness probe handler.
pub async fn liveness() -> &'static str {
    PROBE_OK
}

/// Readiness probe handler.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.health.readiness().await.is_ready() {
        (StatusCode::OK, PROBE_OK)
    } else {
        tracing::warn!("Readiness probe failed: document store unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, PROBE_NOT_READY)
    }
}
