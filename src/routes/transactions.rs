// src/routes/transactions.rs - Transaction ingest/query routes
use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::transactions::{create_transaction, get_transaction, list_transactions};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transaction))
        .route("/", get(list_transactions))
        .route("/{id}", get(get_transaction))
}
