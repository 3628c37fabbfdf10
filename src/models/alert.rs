// src/models/alert.rs - Alert read/update DTOs
use chrono::{DateTime, Utc};
use risksentinel_database::models::Alert;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::PageParams;

pub const ALERT_STATUSES: [&str; 4] = ["open", "acknowledged", "resolved", "closed"];

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertResponse {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub severity: String,
    pub alert_type: String,
    pub message: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Alert> for AlertResponse {
    fn from(a: Alert) -> Self {
        Self {
            id: a.id,
            transaction_id: a.transaction_id,
            severity: a.severity,
            alert_type: a.alert_type,
            message: a.message,
            status: a.status,
            assigned_to: a.assigned_to,
            resolved_at: a.resolved_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Body of `PATCH /alerts/{id}`. At least one field must be present; the
/// handler rejects an entirely-empty body.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AlertUpdateRequest {
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    pub assigned_to: Option<String>,
}

fn validate_status(status: &str) -> Result<(), validator::ValidationError> {
    if ALERT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_alert_status"))
    }
}

/// Query params for `GET /alerts`. Defaults to `status=open` per spec.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AlertListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub severity: Option<String>,
    pub status_filter: Option<String>,
}

impl AlertListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams { page: self.page, page_size: self.page_size }
    }

    pub fn status_or_default(&self) -> String {
        self.status_filter.clone().unwrap_or_else(|| "open".to_string())
    }
}
