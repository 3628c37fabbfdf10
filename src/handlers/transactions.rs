// src/handlers/transactions.rs - Transaction ingest, listing, and detail lookup
use bigdecimal::FromPrimitive;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use risksentinel_database::{AuditLogRepository, TransactionRepository};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::events::payloads::{AlertEvent, TransactionRawEvent, TransactionScoredEvent};
use crate::extractors::auth::OptionalAuth;
use crate::middleware::error_handler::ApiError;
use crate::models::alert::AlertResponse;
use crate::models::common::Paginated;
use crate::models::transaction::{
    AuditLogResponse, RiskScoreResponse, TransactionCreate, TransactionDetailResponse,
    TransactionListQuery, TransactionResponse,
};
use crate::state::AppState;

fn first_validation_error(errors: validator::ValidationErrors) -> ApiError {
    for (field, field_errors) in errors.field_errors() {
        if let Some(err) = field_errors.first() {
            let message = err
                .message
                .clone()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            return ApiError::validation(field.to_string(), message);
        }
    }
    ApiError::validation("body", "validation failed")
}

/// Marks a transaction `declined` after the scoring pipeline failed. Runs in
/// its own commit, separate from the rolled-back scoring attempt, and writes
/// the matching audit entry for the status change.
async fn decline_transaction(state: &AppState, transaction_id: Uuid) {
    let mut tx = match state.db.begin().await {
        Ok(tx) => tx,
        Err(err) => {
            warn!(%err, %transaction_id, "failed to open transaction for decline");
            return;
        }
    };

    if let Err(err) = TransactionRepository::update_status(&mut tx, transaction_id, "declined").await {
        warn!(%err, %transaction_id, "failed to mark transaction declined");
        let _ = tx.rollback().await;
        return;
    }

    let details = serde_json::json!({ "reason": "scoring pipeline failed" });
    if let Err(err) =
        AuditLogRepository::insert(&mut tx, Some(transaction_id), "system", "TRANSACTION_DECLINED", details).await
    {
        warn!(%err, %transaction_id, "failed to write decline audit log");
        let _ = tx.rollback().await;
        return;
    }

    if let Err(err) = tx.commit().await {
        warn!(%err, %transaction_id, "failed to commit transaction decline");
    }
}

/// Ingests a transaction and runs it through the scoring pipeline
/// synchronously. Staging insert, scoring, and the creation audit log share a
/// single commit; a scoring failure rolls that back and marks the
/// transaction declined in a separate commit instead.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = TransactionCreate,
    responses(
        (status = 201, description = "Transaction ingested and scored", body = TransactionResponse),
        (status = 400, description = "Validation or business-rule failure"),
        (status = 500, description = "Scoring pipeline failed"),
    ),
    tag = "Transactions"
)]
#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(payload): Json<TransactionCreate>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    payload.validate().map_err(first_validation_error)?;

    if payload.amount_zar < state.config.min_transaction_amount_zar
        || payload.amount_zar > state.config.max_transaction_amount_zar
    {
        return Err(ApiError::Transaction(format!(
            "amount_zar must be between {} and {}",
            state.config.min_transaction_amount_zar, state.config.max_transaction_amount_zar
        )));
    }

    let amount_zar = bigdecimal::BigDecimal::from_f64(payload.amount_zar)
        .ok_or_else(|| ApiError::Transaction("amount_zar is not representable".to_string()))?;
    let geolocation = payload
        .geolocation
        .map(|g| serde_json::json!({ "lat": g.lat, "lng": g.lng }));
    let actor = user
        .map(|u| format!("api:{}", u.user_id))
        .unwrap_or_else(|| "api:anonymous".to_string());

    let mut tx = state.db.begin().await.map_err(ApiError::from)?;

    let transaction = TransactionRepository::insert_staging(
        &mut tx,
        payload.external_id.as_deref(),
        &payload.sender_id,
        &payload.receiver_id,
        amount_zar,
        &payload.currency,
        payload.channel.as_str(),
        payload.merchant_category.as_deref(),
        payload.ip_address.as_deref(),
        payload.device_fingerprint.as_deref(),
        geolocation,
        payload.metadata.clone(),
    )
    .await
    .map_err(ApiError::from)?;

    let created_details = serde_json::json!({
        "sender_id": transaction.sender_id,
        "receiver_id": transaction.receiver_id,
        "amount_zar": transaction.amount_zar.to_string(),
        "channel": transaction.channel,
    });
    AuditLogRepository::insert(&mut tx, Some(transaction.id), &actor, "TRANSACTION_CREATED", created_details)
        .await
        .map_err(ApiError::from)?;

    let outcome = match state.orchestrator.score_transaction(&mut tx, &transaction).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let _ = tx.rollback().await;
            decline_transaction(&state, transaction.id).await;
            return Err(err.into());
        }
    };

    tx.commit().await.map_err(ApiError::from)?;

    state.events.publish_raw(
        &transaction.id.to_string(),
        &TransactionRawEvent {
            transaction_id: transaction.id,
            sender_id: transaction.sender_id.clone(),
            receiver_id: transaction.receiver_id.clone(),
            amount_zar: transaction.amount_zar.to_string(),
            channel: transaction.channel.clone(),
            created_at: transaction.created_at,
        },
    );
    state.events.publish_scored(
        &transaction.id.to_string(),
        &TransactionScoredEvent {
            transaction_id: transaction.id,
            composite_score: outcome.risk_score.composite_score,
            risk_level: outcome.risk_score.risk_level.clone(),
            triggered_rules: serde_json::from_value(outcome.risk_score.triggered_rules.clone()).unwrap_or_default(),
            scored_at: outcome.risk_score.scored_at,
        },
    );
    if let Some(alert) = &outcome.alert {
        state.events.publish_alert(
            &transaction.id.to_string(),
            &AlertEvent {
                alert_id: alert.id,
                transaction_id: alert.transaction_id,
                severity: alert.severity.clone(),
                alert_type: alert.alert_type.clone(),
                status: alert.status.clone(),
                created_at: alert.created_at,
            },
        );
    }

    info!(
        transaction_id = %transaction.id,
        risk_level = outcome.level.as_str(),
        composite_score = outcome.risk_score.composite_score,
        "transaction scored"
    );

    let mut transaction = transaction;
    if outcome.level.requires_alert() {
        transaction.status = "flagged".to_string();
    }

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::from_transaction(transaction, Some(&outcome.risk_score))),
    ))
}

/// Paginated transaction listing, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(TransactionListQuery),
    responses((status = 200, description = "Paginated transaction list", body = crate::models::common::PaginatedTransactionResponse)),
    tag = "Transactions"
)]
#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Paginated<TransactionResponse>>, ApiError> {
    let page_params = query.page_params();
    let (items, total) = state
        .transactions
        .list_paginated(
            query.status_filter.as_deref(),
            query.sender_id.as_deref(),
            page_params.page(),
            page_params.page_size(),
        )
        .await
        .map_err(ApiError::from)?;

    let mut responses = Vec::with_capacity(items.len());
    for transaction in items {
        let risk_score = state.risk_scores.get_by_transaction(transaction.id).await.map_err(ApiError::from)?;
        responses.push(TransactionResponse::from_transaction(transaction, risk_score.as_ref()));
    }

    Ok(Json(Paginated::new(responses, page_params.page(), page_params.page_size(), total)))
}

/// Full transaction bundle: transaction, risk score, alerts, and audit trail.
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction detail bundle", body = TransactionDetailResponse),
        (status = 404, description = "Transaction not found"),
    ),
    tag = "Transactions"
)]
#[instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionDetailResponse>, ApiError> {
    let transaction = state
        .transactions
        .get(id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("transaction"))?;

    let risk_score = state.risk_scores.get_by_transaction(id).await.map_err(ApiError::from)?;
    let alerts = state.alerts.list_for_transaction(id).await.map_err(ApiError::from)?;
    let audit_logs = state.audit_logs.list_for_transaction(id).await.map_err(ApiError::from)?;

    Ok(Json(TransactionDetailResponse {
        transaction: TransactionResponse::from_transaction(transaction, risk_score.as_ref()),
        risk_score: risk_score.map(RiskScoreResponse::from),
        alerts: alerts.into_iter().map(AlertResponse::from).collect(),
        audit_logs: audit_logs.into_iter().map(AuditLogResponse::from).collect(),
    }))
}
