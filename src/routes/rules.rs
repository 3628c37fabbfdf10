// src/routes/rules.rs - Fraud rule CRUD routes
use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::rules::{create_rule, delete_rule, get_rule, list_rules, update_rule};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_rule))
        .route("/", get(list_rules))
        .route("/{id}", get(get_rule))
        .route("/{id}", patch(update_rule))
        .route("/{id}", axum::routing::delete(delete_rule))
}
