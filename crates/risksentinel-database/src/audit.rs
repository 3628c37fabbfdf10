use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::models::AuditLog;

/// Repository for the append-only `audit_logs` table.
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        tx: &mut SqlxTransaction<'_, Postgres>,
        transaction_id: Option<Uuid>,
        actor: &str,
        action: &str,
        details: Value,
    ) -> Result<AuditLog, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (id, transaction_id, actor, action, details, created_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(actor)
        .bind(action)
        .bind(details)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn list_for_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs WHERE transaction_id = $1 ORDER BY created_at ASC",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await
    }
}
