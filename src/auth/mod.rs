use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issue an opaque access/refresh token pair for a user. Tokens are random
/// and only meaningful to this server instance.
pub fn issue_tokens(state: &AppState, user_id: u64) -> TokenPair {
    let access = Uuid::new_v4().to_string();
    let refresh = Uuid::new_v4().to_string();
    state.access_tokens.insert(access.clone(), user_id);
    state.refresh_tokens.insert(refresh.clone(), user_id);
    TokenPair { access, refresh }
}

/// Exchange a refresh token for a fresh access token. The refresh token
/// stays valid.
pub fn refresh_access_token(state: &AppState, refresh: &str) -> Result<String, AppError> {
    let user_id = state
        .refresh_tokens
        .get(refresh)
        .map(|entry| *entry.value())
        .ok_or_else(|| AppError::Unauthorized("invalid refresh token".to_string()))?;

    let access = Uuid::new_v4().to_string();
    state.access_tokens.insert(access.clone(), user_id);
    Ok(access)
}

/// Authenticated caller, resolved from the `Authorization: Bearer` header.
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn require_role(&self, role: Role, what: &str) -> Result<(), AppError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "only {} can {what}",
                match role {
                    Role::Customer => "customers",
                    Role::Driver => "drivers",
                    Role::Admin => "admins",
                }
            )))
        }
    }

    /// Mobile-app endpoints are for customers and drivers; admins are
    /// blocked outright.
    pub fn forbid_admin(&self) -> Result<(), AppError> {
        if self.0.role == Role::Admin {
            Err(AppError::Forbidden(
                "admins cannot access mobile endpoints".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("invalid authorization header".to_string()))?;

        let user_id = state
            .access_tokens
            .get(token)
            .map(|entry| *entry.value())
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))?;

        let user = state
            .users
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;

        Ok(AuthUser(user))
    }
}
