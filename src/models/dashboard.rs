// src/models/dashboard.rs - Aggregate dashboard DTOs
use chrono::{DateTime, Utc};
use risksentinel_database::dashboard::{RiskTrendRow, RiskiestTransactionRow};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct RiskiestTransaction {
    pub transaction_id: Uuid,
    pub sender_id: String,
    pub composite_score: f64,
    pub risk_level: String,
}

impl From<RiskiestTransactionRow> for RiskiestTransaction {
    fn from(row: RiskiestTransactionRow) -> Self {
        Self {
            transaction_id: row.transaction_id,
            sender_id: row.sender_id,
            composite_score: row.composite_score,
            risk_level: row.risk_level,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeverityCount {
    pub severity: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummaryResponse {
    pub total_transactions: i64,
    pub open_alerts: i64,
    pub critical_alerts: i64,
    pub avg_composite_score: f64,
    pub top_riskiest: Vec<RiskiestTransaction>,
    pub severity_distribution: Vec<SeverityCount>,
    pub velocity_breach_alerts_last_hour: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RiskTrendPoint {
    pub hour: DateTime<Utc>,
    pub avg_score: f64,
    pub txn_count: i64,
}

impl From<RiskTrendRow> for RiskTrendPoint {
    fn from(row: RiskTrendRow) -> Self {
        Self { hour: row.hour, avg_score: row.avg_score, txn_count: row.txn_count }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RiskTrendResponse {
    pub points: Vec<RiskTrendPoint>,
}
