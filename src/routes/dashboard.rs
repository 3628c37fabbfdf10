// src/routes/dashboard.rs - Aggregate dashboard routes
use axum::{routing::get, Router};

use crate::handlers::dashboard::{risk_trend, summary};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary))
        .route("/risk-trend", get(risk_trend))
}
