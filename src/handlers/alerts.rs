// src/handlers/alerts.rs - Alert listing and status transitions
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::extractors::auth::OptionalAuth;
use crate::middleware::error_handler::ApiError;
use crate::models::alert::{AlertListQuery, AlertResponse, AlertUpdateRequest};
use crate::models::common::Paginated;
use crate::state::AppState;

/// Paginated alert listing, defaulting to `status=open`.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    params(AlertListQuery),
    responses((status = 200, description = "Paginated alert list", body = crate::models::common::PaginatedAlertResponse)),
    tag = "Alerts"
)]
#[instrument(skip(state))]
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<Paginated<AlertResponse>>, ApiError> {
    let page_params = query.page_params();
    let status = query.status_or_default();

    let (items, total) = state
        .alerts
        .list_paginated(Some(&status), query.severity.as_deref(), page_params.page(), page_params.page_size())
        .await
        .map_err(ApiError::from)?;

    let responses = items.into_iter().map(AlertResponse::from).collect();

    Ok(Json(Paginated::new(responses, page_params.page(), page_params.page_size(), total)))
}

/// Transitions an alert's status and/or reassigns it. Rejects an empty body
/// and writes the `ALERT_UPDATED` audit entry in the same commit as the
/// status change.
#[utoipa::path(
    patch,
    path = "/api/v1/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert id")),
    request_body = AlertUpdateRequest,
    responses(
        (status = 200, description = "Alert updated", body = AlertResponse),
        (status = 400, description = "Validation failure or empty update body"),
        (status = 404, description = "Alert not found"),
    ),
    tag = "Alerts"
)]
#[instrument(skip(state, payload))]
pub async fn update_alert(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<AlertUpdateRequest>,
) -> Result<Json<AlertResponse>, ApiError> {
    payload.validate().map_err(|errors| {
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
    })?;

    if payload.status.is_none() && payload.assigned_to.is_none() {
        return Err(ApiError::validation("body", "at least one of status or assigned_to is required"));
    }

    let existing = state.alerts.get(id).await.map_err(ApiError::from)?.ok_or_else(|| ApiError::not_found("alert"))?;
    let status = payload.status.clone().unwrap_or(existing.status.clone());

    let mut tx = state.db.begin().await.map_err(ApiError::from)?;

    let updated = risksentinel_database::AlertRepository::update_status(&mut tx, id, &status, payload.assigned_to.as_deref())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("alert"))?;

    let actor = user.map(|u| format!("api:{}", u.user_id)).unwrap_or_else(|| "api:anonymous".to_string());
    let details = serde_json::json!({
        "previous_status": existing.status,
        "new_status": updated.status,
        "assigned_to": updated.assigned_to,
    });
    risksentinel_database::AuditLogRepository::insert(&mut tx, Some(updated.transaction_id), &actor, "ALERT_UPDATED", details)
        .await
        .map_err(ApiError::from)?;

    tx.commit().await.map_err(ApiError::from)?;

    Ok(Json(AlertResponse::from(updated)))
}
