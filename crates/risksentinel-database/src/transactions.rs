use bigdecimal::BigDecimal;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::models::Transaction;

/// Repository for the `transactions` table.
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Stages a new transaction row with `status = 'pending'`. Part of the
    /// single transactional scoring unit — callers flush this insert before
    /// running rule/velocity/anomaly signals against it.
    pub async fn insert_staging(
        tx: &mut SqlxTransaction<'_, Postgres>,
        external_id: Option<&str>,
        sender_id: &str,
        receiver_id: &str,
        amount_zar: BigDecimal,
        currency: &str,
        channel: &str,
        merchant_category: Option<&str>,
        ip_address: Option<&str>,
        device_fingerprint: Option<&str>,
        geolocation: Option<Value>,
        metadata: Value,
    ) -> Result<Transaction, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                id, external_id, sender_id, receiver_id, amount_zar, currency,
                channel, merchant_category, ip_address, device_fingerprint,
                geolocation, status, metadata, created_at, updated_at
            ) VALUES (
                gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                'pending', $11, NOW(), NOW()
            )
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(amount_zar)
        .bind(currency)
        .bind(channel)
        .bind(merchant_category)
        .bind(ip_address)
        .bind(device_fingerprint)
        .bind(geolocation)
        .bind(metadata)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn update_status(
        tx: &mut SqlxTransaction<'_, Postgres>,
        transaction_id: Uuid,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE transactions SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status)
            .bind(transaction_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn get(&self, transaction_id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Sliding-window history for the velocity calculator: transactions sent
    /// by `sender_id` within the last `window_seconds`, excluding the
    /// transaction currently being scored.
    pub async fn recent_by_sender(
        &self,
        sender_id: &str,
        window_seconds: i64,
        exclude_id: Uuid,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE sender_id = $1
                AND id != $2
                AND created_at >= NOW() - ($3 || ' seconds')::interval
            ORDER BY created_at ASC
            "#,
        )
        .bind(sender_id)
        .bind(exclude_id)
        .bind(window_seconds.to_string())
        .fetch_all(&self.pool)
        .await
    }

    /// Historical amounts for `sender_id` used as the population for the
    /// anomaly calculator's mean/standard-deviation baseline.
    pub async fn historical_amounts_by_sender(
        &self,
        sender_id: &str,
        exclude_id: Uuid,
        lookback_days: i64,
    ) -> Result<Vec<BigDecimal>, sqlx::Error> {
        sqlx::query_scalar::<_, BigDecimal>(
            r#"
            SELECT amount_zar FROM transactions
            WHERE sender_id = $1
                AND id != $2
                AND created_at >= NOW() - ($3 || ' days')::interval
                AND status != 'declined'
            ORDER BY created_at ASC
            "#,
        )
        .bind(sender_id)
        .bind(exclude_id)
        .bind(lookback_days.to_string())
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_paginated(
        &self,
        status: Option<&str>,
        sender_id: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Transaction>, i64), sqlx::Error> {
        let offset = (page - 1).max(0) * page_size;

        let mut items_query = QueryBuilder::<Postgres>::new("SELECT * FROM transactions WHERE 1=1");
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions WHERE 1=1");

        if let Some(status) = status {
            items_query.push(" AND status = ").push_bind(status);
            count_query.push(" AND status = ").push_bind(status);
        }
        if let Some(sender_id) = sender_id {
            items_query.push(" AND sender_id = ").push_bind(sender_id);
            count_query.push(" AND sender_id = ").push_bind(sender_id);
        }

        items_query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind(offset);

        let items = items_query
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((items, total))
    }

    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
    }
}
