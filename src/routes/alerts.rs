// src/routes/alerts.rs - Alert query/update routes
use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::alerts::{list_alerts, update_alert};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts))
        .route("/{id}", patch(update_alert))
}
