use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::models::Alert;

/// Repository for the `alerts` table.
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        tx: &mut SqlxTransaction<'_, Postgres>,
        transaction_id: Uuid,
        severity: &str,
        alert_type: &str,
        message: &str,
        metadata: Value,
    ) -> Result<Alert, sqlx::Error> {
        sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (
                id, transaction_id, severity, alert_type, message, status,
                assigned_to, resolved_at, metadata, created_at, updated_at
            ) VALUES (
                gen_random_uuid(), $1, $2, $3, $4, 'open', NULL, NULL, $5, NOW(), NOW()
            )
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(severity)
        .bind(alert_type)
        .bind(message)
        .bind(metadata)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Alert>, sqlx::Error> {
        sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_for_transaction(&self, transaction_id: Uuid) -> Result<Vec<Alert>, sqlx::Error> {
        sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE transaction_id = $1 ORDER BY created_at ASC")
            .bind(transaction_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Count of `VELOCITY_BREACH` alerts created within the past hour, used
    /// by the dashboard summary.
    pub async fn count_velocity_breaches_since(&self, since: chrono::DateTime<chrono::Utc>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM alerts WHERE alert_type = 'VELOCITY_BREACH' AND created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
    }

    /// Severity distribution over currently-open alerts.
    pub async fn open_severity_distribution(&self) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT severity, COUNT(*) FROM alerts WHERE status = 'open' GROUP BY severity",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_open(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE status = 'open'")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_critical_open(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE status = 'open' AND severity = 'CRITICAL'")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn list_paginated(
        &self,
        status: Option<&str>,
        severity: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Alert>, i64), sqlx::Error> {
        let offset = (page - 1).max(0) * page_size;

        let mut items_query = QueryBuilder::<Postgres>::new("SELECT * FROM alerts WHERE 1=1");
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM alerts WHERE 1=1");

        if let Some(status) = status {
            items_query.push(" AND status = ").push_bind(status);
            count_query.push(" AND status = ").push_bind(status);
        }
        if let Some(severity) = severity {
            items_query.push(" AND severity = ").push_bind(severity);
            count_query.push(" AND severity = ").push_bind(severity);
        }

        items_query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind(offset);

        let items = items_query.build_query_as::<Alert>().fetch_all(&self.pool).await?;
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((items, total))
    }

    /// Updates status and/or assignment inside the caller's transaction, so
    /// the matching audit log entry commits atomically with it.
    pub async fn update_status(
        tx: &mut SqlxTransaction<'_, Postgres>,
        id: Uuid,
        status: &str,
        assigned_to: Option<&str>,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let resolved_at_clause = if status == "resolved" {
            "resolved_at = NOW()"
        } else {
            "resolved_at = resolved_at"
        };

        let query = format!(
            r#"
            UPDATE alerts
            SET status = $1, assigned_to = COALESCE($2, assigned_to), updated_at = NOW(), {resolved_at_clause}
            WHERE id = $3
            RETURNING *
            "#
        );

        sqlx::query_as::<_, Alert>(&query)
            .bind(status)
            .bind(assigned_to)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}
