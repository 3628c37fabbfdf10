use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One row of the "top riskiest transactions" aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct RiskiestTransactionRow {
    pub transaction_id: Uuid,
    pub sender_id: String,
    pub composite_score: f64,
    pub risk_level: String,
}

/// One hourly bucket of the 24-hour risk trend.
#[derive(Debug, Clone, FromRow)]
pub struct RiskTrendRow {
    pub hour: DateTime<Utc>,
    pub avg_score: f64,
    pub txn_count: i64,
}

/// Read-only aggregate queries backing `GET /dashboard/summary` and
/// `GET /dashboard/risk-trend`. Kept separate from the entity repositories
/// since these never participate in the scoring transaction.
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn avg_composite_score(&self) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar("SELECT AVG(composite_score) FROM risk_scores")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn top_riskiest(&self, limit: i64) -> Result<Vec<RiskiestTransactionRow>, sqlx::Error> {
        sqlx::query_as::<_, RiskiestTransactionRow>(
            r#"
            SELECT t.id AS transaction_id, t.sender_id, rs.composite_score, rs.risk_level
            FROM risk_scores rs
            JOIN transactions t ON t.id = rs.transaction_id
            ORDER BY rs.composite_score DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Last 24 hours of scored transactions bucketed by hour.
    pub async fn risk_trend_last_24h(&self) -> Result<Vec<RiskTrendRow>, sqlx::Error> {
        sqlx::query_as::<_, RiskTrendRow>(
            r#"
            SELECT date_trunc('hour', scored_at) AS hour,
                   AVG(composite_score) AS avg_score,
                   COUNT(*) AS txn_count
            FROM risk_scores
            WHERE scored_at >= NOW() - INTERVAL '24 hours'
            GROUP BY hour
            ORDER BY hour ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
