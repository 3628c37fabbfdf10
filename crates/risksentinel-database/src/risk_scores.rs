use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::models::RiskScore;

/// Repository for the `risk_scores` table (one-to-one with `transactions`).
pub struct RiskScoreRepository {
    pool: PgPool,
}

impl RiskScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        tx: &mut SqlxTransaction<'_, Postgres>,
        transaction_id: Uuid,
        composite_score: f64,
        rule_score: f64,
        velocity_score: f64,
        anomaly_score: f64,
        ml_score: Option<f64>,
        risk_level: &str,
        triggered_rules: Value,
        explanation: Value,
    ) -> Result<RiskScore, sqlx::Error> {
        sqlx::query_as::<_, RiskScore>(
            r#"
            INSERT INTO risk_scores (
                id, transaction_id, composite_score, rule_score, velocity_score,
                anomaly_score, ml_score, risk_level, triggered_rules, explanation, scored_at
            ) VALUES (
                gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()
            )
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(composite_score)
        .bind(rule_score)
        .bind(velocity_score)
        .bind(anomaly_score)
        .bind(ml_score)
        .bind(risk_level)
        .bind(triggered_rules)
        .bind(explanation)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn get_by_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<RiskScore>, sqlx::Error> {
        sqlx::query_as::<_, RiskScore>("SELECT * FROM risk_scores WHERE transaction_id = $1")
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await
    }
}
