// src/handlers/health.rs - Liveness, readiness, and Prometheus metrics endpoints
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::state::AppState;

const BUS_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub healthy: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub database: ServiceStatus,
    pub message_bus: ServiceStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: ServiceStatus,
    pub message_bus: ServiceStatus,
}

async fn ping_database(state: &AppState) -> ServiceStatus {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => ServiceStatus { healthy: true, detail: None },
        Err(err) => {
            warn!(%err, "database ping failed");
            ServiceStatus { healthy: false, detail: Some(err.to_string()) }
        }
    }
}

async fn ping_bus(state: &AppState) -> ServiceStatus {
    let events = state.events.clone();
    let healthy = tokio::task::spawn_blocking(move || events.is_healthy(BUS_PROBE_TIMEOUT))
        .await
        .unwrap_or(false);

    if healthy {
        ServiceStatus { healthy: true, detail: None }
    } else {
        ServiceStatus { healthy: false, detail: Some("broker metadata fetch failed".to_string()) }
    }
}

/// Liveness check: DB ping + bus liveness + uptime. Returns 200 when healthy
/// or degraded (bus unreachable but DB up), 503 when the database is down.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse),
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ping_database(&state).await;
    let message_bus = ping_bus(&state).await;

    let status = if !database.healthy {
        "unhealthy"
    } else if !message_bus.healthy {
        "degraded"
    } else {
        "healthy"
    };

    let status_code = if database.healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let uptime_seconds = (chrono::Utc::now() - state.started_at).num_seconds();

    let body = HealthResponse {
        status: status.to_string(),
        service: "risksentinel-backend".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        database,
        message_bus,
    };

    (status_code, Json(body))
}

/// Readiness probe: checks the same dependencies as `/health` but is meant
/// for orchestrator traffic gating rather than alerting.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Service is ready to accept traffic", body = ReadinessResponse),
        (status = 503, description = "A required dependency is unavailable", body = ReadinessResponse),
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = ping_database(&state).await;
    let message_bus = ping_bus(&state).await;
    let ready = database.healthy && message_bus.healthy;

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (status_code, Json(ReadinessResponse { ready, database, message_bus }))
}

/// Prometheus text-format metrics, exposed only when `METRICS_ENABLED`.
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Prometheus metrics snapshot"),
        (status = 404, description = "Metrics disabled"),
    ),
    tag = "Health"
)]
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    if !state.config.metrics_enabled {
        return (StatusCode::NOT_FOUND, String::new());
    }
    (StatusCode::OK, state.metrics.render())
}
