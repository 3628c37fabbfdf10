// src/handlers/dashboard.rs - Aggregate fraud-operations dashboard
use axum::{extract::State, response::Json};
use chrono::Duration;
use tracing::instrument;

use crate::middleware::error_handler::ApiError;
use crate::models::dashboard::{
    DashboardSummaryResponse, RiskTrendPoint, RiskTrendResponse, RiskiestTransaction, SeverityCount,
};
use crate::state::AppState;

const TOP_RISKIEST_LIMIT: i64 = 5;

/// Rolled-up operational summary: transaction and alert counts, average
/// composite score, the riskiest transactions, and the open-alert severity
/// breakdown.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    responses((status = 200, description = "Dashboard summary", body = DashboardSummaryResponse)),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummaryResponse>, ApiError> {
    let total_transactions = state.transactions.count_all().await.map_err(ApiError::from)?;
    let open_alerts = state.alerts.count_open().await.map_err(ApiError::from)?;
    let critical_alerts = state.alerts.count_critical_open().await.map_err(ApiError::from)?;
    let avg_composite_score = state.dashboard.avg_composite_score().await.map_err(ApiError::from)?.unwrap_or(0.0);
    let top_riskiest = state.dashboard.top_riskiest(TOP_RISKIEST_LIMIT).await.map_err(ApiError::from)?;
    let severity_distribution = state.alerts.open_severity_distribution().await.map_err(ApiError::from)?;

    let since = chrono::Utc::now() - Duration::hours(1);
    let velocity_breach_alerts_last_hour = state.alerts.count_velocity_breaches_since(since).await.map_err(ApiError::from)?;

    Ok(Json(DashboardSummaryResponse {
        total_transactions,
        open_alerts,
        critical_alerts,
        avg_composite_score,
        top_riskiest: top_riskiest.into_iter().map(RiskiestTransaction::from).collect(),
        severity_distribution: severity_distribution
            .into_iter()
            .map(|(severity, count)| SeverityCount { severity, count })
            .collect(),
        velocity_breach_alerts_last_hour,
    }))
}

/// Hourly average composite score and scored-transaction count over the
/// trailing 24 hours.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/risk-trend",
    responses((status = 200, description = "24-hour risk trend", body = RiskTrendResponse)),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn risk_trend(State(state): State<AppState>) -> Result<Json<RiskTrendResponse>, ApiError> {
    let points = state.dashboard.risk_trend_last_24h().await.map_err(ApiError::from)?;
    Ok(Json(RiskTrendResponse { points: points.into_iter().map(RiskTrendPoint::from).collect() }))
}
