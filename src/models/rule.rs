// src/models/rule.rs - Fraud rule CRUD DTOs
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use risksentinel_database::models::FraudRule;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref RULE_CODE_PATTERN: Regex = Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap();
}

fn validate_code(code: &str) -> Result<(), validator::ValidationError> {
    if RULE_CODE_PATTERN.is_match(code) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("rule code must be uppercase letters, digits, and underscores"))
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RuleCreateRequest {
    #[validate(length(min = 1, max = 64), custom(function = "validate_code"))]
    pub code: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub weight: f64,

    pub condition: serde_json::Value,
}

/// Body of `PUT`/`PATCH /rules/{id}` — every field optional, unset fields
/// are left unchanged.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RuleUpdateRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub weight: Option<f64>,

    pub condition: Option<serde_json::Value>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RuleResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub weight: f64,
    pub condition: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FraudRule> for RuleResponse {
    fn from(r: FraudRule) -> Self {
        Self {
            id: r.id,
            code: r.code,
            name: r.name,
            description: r.description,
            weight: r.weight,
            condition: r.condition,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
