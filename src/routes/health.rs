//! Health check endpoint for container orchestration.
//!
//! A liveness probe: it reads only state that already exists in memory, so it
//! cannot fail and always answers 200 while the process can serve HTTP. Used by
//! Kubernetes, ECS, systemd and load balancers to verify the service is alive.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::clock::format_iso8601;
use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds on the monotonic clock since the application was built.
    pub uptime: f64,
    pub timestamp: String,
    pub boot_time: String,
    pub version: String,
}

impl HealthResponse {
    /// Snapshot of the application's health as of now.
    pub fn snapshot(state: &AppState) -> Self {
        let clock = state.clock.as_ref();
        Self {
            status: "ok",
            uptime: state.boot.uptime(clock).as_secs_f64(),
            timestamp: format_iso8601(clock.now()),
            boot_time: state.boot.boot_time_iso().to_string(),
            version: state.config.app.version.clone(),
        }
    }
}

/// Health check handler.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::snapshot(&state))
}
