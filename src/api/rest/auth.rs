use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{self, AuthUser};
use crate::error::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register/", post(register))
        .route("/auth/login/", post(login))
        .route("/auth/refresh/", post(refresh))
        .route("/auth/profile/", get(get_profile).patch(update_profile))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub register_as: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

fn user_summary(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.full_name(),
        "email": user.email,
        "phone": user.phone,
        "role": user.role,
    })
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".to_string()));
    }
    if payload.username.trim().is_empty() {
        return Err(AppError::BadRequest("username is required".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if payload.password != payload.password_confirm {
        return Err(AppError::BadRequest("passwords do not match".to_string()));
    }

    // Self-service registration covers drivers and customers only; the
    // admin account is seeded from config.
    let role = match payload.register_as.as_str() {
        "driver" => Role::Driver,
        "customer" => Role::Customer,
        other => {
            return Err(AppError::BadRequest(format!(
                "cannot register as {other}"
            )))
        }
    };

    if state.user_by_email(&payload.email).is_some() {
        return Err(AppError::BadRequest("email already registered".to_string()));
    }

    let id = state.next_user_id();
    let user = User {
        id,
        email: payload.email,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        role,
        password: payload.password,
        created_at: Utc::now(),
    };
    state.users.insert(id, user.clone());

    let tokens = auth::issue_tokens(&state, id);
    info!(user_id = id, role = user.role.as_str(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "token": tokens.access,
                "refresh": tokens.refresh,
                "user": user_summary(&user),
            }
        })),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let user = state
        .user_by_email(&payload.email)
        .filter(|user| user.password == payload.password)
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    let tokens = auth::issue_tokens(&state, user.id);
    info!(user_id = user.id, "user logged in");

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": tokens.access,
            "refresh": tokens.refresh,
            "user": user_summary(&user),
        }
    })))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, AppError> {
    let access = auth::refresh_access_token(&state, &payload.refresh)?;
    Ok(Json(json!({
        "success": true,
        "data": { "token": access }
    })))
}

async fn get_profile(user: AuthUser) -> Json<Value> {
    let user = user.0;
    Json(json!({
        "success": true,
        "data": {
            "id": user.id,
            "email": user.email,
            "username": user.username,
            "first_name": user.first_name,
            "last_name": user.last_name,
            "phone": user.phone,
            "role": user.role,
        }
    }))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let mut entry = state
        .users
        .get_mut(&user.0.id)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    if let Some(first_name) = payload.first_name {
        entry.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        entry.last_name = last_name;
    }
    if let Some(phone) = payload.phone {
        entry.phone = phone;
    }

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": entry.id,
            "name": entry.full_name(),
            "phone": entry.phone,
            "updatedAt": Utc::now(),
        }
    })))
}
