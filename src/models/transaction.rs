// src/models/transaction.rs - Transaction ingest/read DTOs
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use risksentinel_database::models::{Alert, AuditLog, RiskScore, Transaction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use super::alert::AlertResponse;
use super::common::PageParams;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Api,
    MobileBanking,
    Pos,
    Ussd,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::MobileBanking => "mobile_banking",
            Self::Pos => "pos",
            Self::Ussd => "ussd",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, Validate)]
pub struct GeoLocation {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

fn default_currency() -> String {
    "ZAR".to_string()
}

fn default_metadata() -> serde_json::Value {
    serde_json::json!({})
}

/// Body of `POST /transactions`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TransactionCreate {
    pub external_id: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub sender_id: String,

    #[validate(length(min = 1, max = 128))]
    pub receiver_id: String,

    #[validate(range(min = 0.0))]
    pub amount_zar: f64,

    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,

    pub channel: Channel,

    pub merchant_category: Option<String>,
    pub ip_address: Option<String>,
    pub device_fingerprint: Option<String>,

    #[validate(nested)]
    pub geolocation: Option<GeoLocation>,

    #[serde(default = "default_metadata")]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub sender_id: String,
    pub receiver_id: String,
    #[schema(value_type = f64)]
    pub amount_zar: BigDecimal,
    pub currency: String,
    pub channel: String,
    pub merchant_category: Option<String>,
    pub status: String,
    pub composite_score: Option<f64>,
    pub risk_level: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionResponse {
    pub fn from_transaction(transaction: Transaction, risk_score: Option<&RiskScore>) -> Self {
        Self {
            id: transaction.id,
            external_id: transaction.external_id,
            sender_id: transaction.sender_id,
            receiver_id: transaction.receiver_id,
            amount_zar: transaction.amount_zar,
            currency: transaction.currency,
            channel: transaction.channel,
            merchant_category: transaction.merchant_category,
            status: transaction.status,
            composite_score: risk_score.map(|r| r.composite_score),
            risk_level: risk_score.map(|r| r.risk_level.clone()),
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RiskScoreResponse {
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

impl From<RiskScore> for RiskScoreResponse {
    fn from(r: RiskScore) -> Self {
        Self {
            composite_score: r.composite_score,
            rule_score: r.rule_score,
            velocity_score: r.velocity_score,
            anomaly_score: r.anomaly_score,
            ml_score: r.ml_score,
            risk_level: r.risk_level,
            triggered_rules: r.triggered_rules,
            explanation: r.explanation,
            scored_at: r.scored_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    pub id: Uuid,
    pub actor: String,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(a: AuditLog) -> Self {
        Self { id: a.id, actor: a.actor, action: a.action, details: a.details, created_at: a.created_at }
    }
}

/// Body of `GET /transactions/{id}` — the full transaction + risk + alert +
/// audit bundle.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDetailResponse {
    #[serde(flatten)]
    pub transaction: TransactionResponse,
    pub risk_score: Option<RiskScoreResponse>,
    pub alerts: Vec<AlertResponse>,
    pub audit_logs: Vec<AuditLogResponse>,
}

/// Query params for `GET /transactions`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TransactionListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status_filter: Option<String>,
    pub sender_id: Option<String>,
}

impl TransactionListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams { page: self.page, page_size: self.page_size }
    }
}
