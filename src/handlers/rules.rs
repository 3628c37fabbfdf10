// src/handlers/rules.rs - Fraud rule CRUD
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::engine::Condition;
use crate::extractors::auth::AdminAuth;
use crate::middleware::error_handler::ApiError;
use crate::models::rule::{RuleCreateRequest, RuleResponse, RuleUpdateRequest};
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

/// Creates a fraud rule. Requires admin authentication; duplicate codes are
/// rejected with 409 and a malformed condition tree with 400.
#[utoipa::path(
    post,
    path = "/api/v1/rules",
    request_body = RuleCreateRequest,
    responses(
        (status = 201, description = "Rule created", body = RuleResponse),
        (status = 400, description = "Validation failure or malformed condition"),
        (status = 409, description = "Rule code already exists"),
    ),
    security(("admin_auth" = [])),
    tag = "Rules"
)]
#[instrument(skip(state, payload))]
pub async fn create_rule(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(payload): Json<RuleCreateRequest>,
) -> Result<(StatusCode, Json<RuleResponse>), ApiError> {
    payload.validate().map_err(first_validation_error)?;

    Condition::validate_shape(&payload.condition)
        .map_err(|message| ApiError::validation("condition", message))?;

    if state.rules.get_by_code(&payload.code).await.map_err(ApiError::from)?.is_some() {
        return Err(ApiError::Conflict { message: format!("rule code '{}' already exists", payload.code) });
    }

    let rule = state
        .rules
        .create(&payload.code, &payload.name, payload.description.as_deref(), payload.weight, payload.condition)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(RuleResponse::from(rule))))
}

/// Lists every rule, active and inactive.
#[utoipa::path(
    get,
    path = "/api/v1/rules",
    responses((status = 200, description = "All rules", body = [RuleResponse])),
    tag = "Rules"
)]
#[instrument(skip(state))]
pub async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<RuleResponse>>, ApiError> {
    let rules = state.rules.list_all().await.map_err(ApiError::from)?;
    Ok(Json(rules.into_iter().map(RuleResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/rules/{id}",
    params(("id" = Uuid, Path, description = "Rule id")),
    responses(
        (status = 200, description = "Rule detail", body = RuleResponse),
        (status = 404, description = "Rule not found"),
    ),
    tag = "Rules"
)]
#[instrument(skip(state))]
pub async fn get_rule(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<RuleResponse>, ApiError> {
    let rule = state.rules.get(id).await.map_err(ApiError::from)?.ok_or_else(|| ApiError::not_found("rule"))?;
    Ok(Json(RuleResponse::from(rule)))
}

/// Partial update of name, description, weight, condition, and/or active
/// state. A supplied `condition` is shape-validated before persisting.
#[utoipa::path(
    patch,
    path = "/api/v1/rules/{id}",
    params(("id" = Uuid, Path, description = "Rule id")),
    request_body = RuleUpdateRequest,
    responses(
        (status = 200, description = "Rule updated", body = RuleResponse),
        (status = 400, description = "Validation failure or malformed condition"),
        (status = 404, description = "Rule not found"),
    ),
    security(("admin_auth" = [])),
    tag = "Rules"
)]
#[instrument(skip(state, payload))]
pub async fn update_rule(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<RuleUpdateRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    payload.validate().map_err(first_validation_error)?;

    if let Some(condition) = &payload.condition {
        Condition::validate_shape(condition).map_err(|message| ApiError::validation("condition", message))?;
    }

    let rule = state
        .rules
        .update(id, payload.name.as_deref(), payload.description.as_deref(), payload.weight, payload.condition, payload.is_active)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("rule"))?;

    Ok(Json(RuleResponse::from(rule)))
}

/// Soft-deletes a rule by deactivating it — the row, and its history in any
/// already-scored transaction's `triggered_rules`, is preserved.
#[utoipa::path(
    delete,
    path = "/api/v1/rules/{id}",
    params(("id" = Uuid, Path, description = "Rule id")),
    responses(
        (status = 204, description = "Rule deactivated"),
        (status = 404, description = "Rule not found"),
    ),
    security(("admin_auth" = [])),
    tag = "Rules"
)]
#[instrument(skip(state))]
pub async fn delete_rule(State(state): State<AppState>, _admin: AdminAuth, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.rules.get(id).await.map_err(ApiError::from)?.ok_or_else(|| ApiError::not_found("rule"))?;
    state.rules.set_active(id, false).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
