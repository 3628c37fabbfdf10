// src/middleware/error_handler.rs - Error taxonomy and response envelope
use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application-wide error kinds. Maps directly onto the taxonomy in the
/// scoring/transaction design: `bus` and `ml` never reach this type because
/// their producers already degrade internally rather than raising.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("authorization failed: insufficient permissions")]
    Authorization,

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("transaction rejected: {0}")]
    Transaction(String),

    #[error("scoring failed: {0}")]
    Scoring(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("rate limit exceeded: {limit} requests per {window} seconds")]
    RateLimit { limit: u32, window: u64 },

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Transaction(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Scoring(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication(_) => "AUTH_FAILED",
            Self::Authorization => "ACCESS_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Transaction(_) => "TRANSACTION_REJECTED",
            Self::Scoring(_) => "SCORING_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::RateLimit { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-caused errors log as warnings; everything else is an error.
    pub fn should_log_as_error(&self) -> bool {
        !matches!(
            self,
            Self::Validation { .. }
                | Self::Authentication(_)
                | Self::Authorization
                | Self::NotFound { .. }
                | Self::Conflict { .. }
                | Self::Transaction(_)
                | Self::RateLimit { .. }
        )
    }
}

impl From<crate::scoring::ScoringError> for ApiError {
    fn from(err: crate::scoring::ScoringError) -> Self {
        Self::Scoring(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = Uuid::new_v4();

        if self.should_log_as_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = self.error_code(),
                error = %self,
                "request failed"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = self.error_code(),
                error = %self,
                "request rejected"
            );
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "request_id": request_id,
            }
        }));

        (status, body).into_response()
    }
}

/// Attaches request id / timing headers and logs failed requests.
pub async fn handle_error(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let mut response = next.run(request).await;
    let elapsed = start.elapsed();

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert("x-request-id", value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{}ms", elapsed.as_millis())) {
        headers.insert("x-response-time", value);
    }

    if response.status().is_client_error() || response.status().is_server_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            elapsed_ms = elapsed.as_millis(),
            request_id = request_id,
            "request completed with error"
        );
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            elapsed_ms = elapsed.as_millis(),
            request_id = request_id,
            "request completed"
        );
    }

    response
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(sqlx_err) = err.downcast_ref::<sqlx::Error>() {
            return Self::Internal(format!("database error: {sqlx_err}"));
        }
        tracing::error!("unhandled error converted to ApiError: {:#}", err);
        Self::Internal(err.to_string())
    }
}

#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::middleware::error_handler::ApiError::Validation {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::Authentication("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Authorization.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("transaction").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict { message: "dup".into() }.status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::RateLimit { limit: 100, window: 60 }.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::Scoring("boom".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_do_not_log_as_error() {
        assert!(!ApiError::validation("amount_zar", "must be positive").should_log_as_error());
        assert!(!ApiError::not_found("alert").should_log_as_error());
        assert!(ApiError::Database(sqlx::Error::RowNotFound).should_log_as_error());
    }
}
