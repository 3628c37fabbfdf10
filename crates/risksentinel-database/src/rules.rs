use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::FraudRule;

/// Repository for the `fraud_rules` table — dynamic, CRUD-able rule
/// definitions consumed by the rule engine.
pub struct RuleRepository {
    pool: PgPool,
}

impl RuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active(&self) -> Result<Vec<FraudRule>, sqlx::Error> {
        sqlx::query_as::<_, FraudRule>(
            "SELECT * FROM fraud_rules WHERE is_active = TRUE ORDER BY code ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_all(&self) -> Result<Vec<FraudRule>, sqlx::Error> {
        sqlx::query_as::<_, FraudRule>("SELECT * FROM fraud_rules ORDER BY code ASC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<FraudRule>, sqlx::Error> {
        sqlx::query_as::<_, FraudRule>("SELECT * FROM fraud_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<FraudRule>, sqlx::Error> {
        sqlx::query_as::<_, FraudRule>("SELECT * FROM fraud_rules WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(
        &self,
        code: &str,
        name: &str,
        description: Option<&str>,
        weight: f64,
        condition: Value,
    ) -> Result<FraudRule, sqlx::Error> {
        sqlx::query_as::<_, FraudRule>(
            r#"
            INSERT INTO fraud_rules (id, code, name, description, weight, condition, is_active, created_at, updated_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, TRUE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(description)
        .bind(weight)
        .bind(condition)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE fraud_rules SET is_active = $1, updated_at = NOW() WHERE id = $2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_weight(&self, id: Uuid, weight: f64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE fraud_rules SET weight = $1, updated_at = NOW() WHERE id = $2")
            .bind(weight)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Partial update used by `PUT`/`PATCH /rules/{id}` — every field is
    /// `COALESCE`d against the current row, so callers only pass what
    /// changed.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        weight: Option<f64>,
        condition: Option<Value>,
        is_active: Option<bool>,
    ) -> Result<Option<FraudRule>, sqlx::Error> {
        sqlx::query_as::<_, FraudRule>(
            r#"
            UPDATE fraud_rules
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                weight = COALESCE($3, weight),
                condition = COALESCE($4, condition),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(weight)
        .bind(condition)
        .bind(is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
