use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount_zar: BigDecimal,
    pub currency: String,
    pub channel: String,
    pub merchant_category: Option<String>,
    pub ip_address: Option<String>,
    pub device_fingerprint: Option<String>,
    pub geolocation: Option<serde_json::Value>,
    pub status: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiskScore {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub composite_score: f64,
    pub rule_score: f64,
    pub velocity_score: f64,
    pub anomaly_score: f64,
    pub ml_score: Option<f64>,
    pub risk_level: String,
    pub triggered_rules: serde_json::Value,
    pub explanation: serde_json::Value,
    pub scored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FraudRule {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub weight: f64,
    pub condition: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub severity: String,
    pub alert_type: String,
    pub message: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub transaction_id: Option<Uuid>,
    pub actor: String,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
