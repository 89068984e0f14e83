//! Liveness probe
//!
//! Answers without touching the KPI API. Reports the selection so a
//! monitor can tell a dashboard stuck on the static default (empty state)
//! from a healthy one.

use axum::{extract::State, routing::get, Json, Router};
use hw_common::Year;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub year: Year,
    pub empty_state: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: "hw-dash",
        version: env!("CARGO_PKG_VERSION"),
        year: state.coordinator.year(),
        empty_state: state.coordinator.is_empty_state(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
