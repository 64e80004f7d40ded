use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::{Claims, LoginRequest, LoginResponse};
use crate::AppState;

use super::ApiError;

/// Lifetime of an issued token
const TOKEN_TTL_HOURS: i64 = 24;

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let user = state
        .store
        .get_user_by_username(&req.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let valid = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|_| ApiError::internal("password verification error"))?;

    if !valid {
        tracing::warn!(username = %req.username, "rejected login");
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let token = issue_token(&user.id, &user.username, &state.config.jwt_secret)
        .map_err(|e| ApiError::internal(format!("token generation error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
    }))
}

pub(crate) fn issue_token(user_id: &str, username: &str, secret: &str) -> jsonwebtoken::errors::Result<String> {
    let now = chrono::Utc::now();
    let exp = now + chrono::TimeDelta::hours(TOKEN_TTL_HOURS);

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}
