// src/events/payloads.rs - Self-describing textual event payloads
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRawEvent {
    pub transaction_id: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount_zar: String,
    pub channel: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionScoredEvent {
    pub transaction_id: Uuid,
    pub composite_score: f64,
    pub risk_level: String,
    pub triggered_rules: Vec<String>,
    pub scored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub alert_id: Uuid,
    pub transaction_id: Uuid,
    pub severity: String,
    pub alert_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
