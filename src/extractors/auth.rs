// src/extractors/auth.rs - Operator authentication extractors
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::middleware::auth::UserTier;

/// Operator identity extracted from request headers, set by the auth
/// middleware. A placeholder until a real identity provider is wired up.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub user_tier: UserTier,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingUserId)?
            .to_string();

        let user_tier = parts
            .headers
            .get("x-user-tier")
            .and_then(|h| h.to_str().ok())
            .map(|tier| match tier {
                "admin" => UserTier::Admin,
                _ => UserTier::Analyst,
            })
            .unwrap_or(UserTier::Analyst);

        Ok(AuthUser { user_id, user_tier })
    }
}

/// Optional authentication — `None` if not authenticated.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(AuthUser::from_request_parts(parts, state).await.ok()))
    }
}

/// Admin-only extractor — rejects non-admin operators.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AuthUser);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        if auth_user.user_tier != UserTier::Admin {
            return Err(AuthError::InsufficientPermissions);
        }
        Ok(AdminAuth(auth_user))
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.user_tier == UserTier::Admin
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingUserId,
    InsufficientPermissions,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingUserId => (StatusCode::UNAUTHORIZED, "Missing user id"),
            AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        };

        let body = Json(json!({
            "error": {
                "code": "AUTH_FAILED",
                "message": message,
                "request_id": Uuid::new_v4(),
            }
        }));

        (status, body).into_response()
    }
}
