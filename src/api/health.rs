//! Health check endpoints for liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

/// Health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub checks: Vec<HealthCheck>,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Reports the retrieval store's reachability; a missing knowledge index is
/// only degraded because the first ingestion creates it
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let knowledge = check_knowledge_index(&state).await;
    let status = knowledge.status;

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: vec![knowledge],
        latency_ms: start.elapsed().as_millis() as u64,
    };

    let status_code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness probe
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_knowledge_index(state: &AppState) -> HealthCheck {
    let start = Instant::now();
    let index = state.knowledge_index();

    let (status, message) = match state.gateway.index_exists(index).await {
        Ok(true) => (HealthStatus::Healthy, None),
        Ok(false) => (
            HealthStatus::Degraded,
            Some(format!("Index '{}' has not been created yet", index)),
        ),
        Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
    };

    HealthCheck {
        name: format!("{}:{}", state.gateway.backend_name(), index),
        status,
        message,
        latency_ms: start.elapsed().as_millis() as u64,
    }
}
