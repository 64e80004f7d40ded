use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::models::Claims;
use crate::AppState;

/// Extractor that validates the bearer JWT and provides the caller's claims.
///
/// Add `_auth: AuthUser` to a handler's parameters to require authentication.
pub struct AuthUser {
    pub claims: Claims,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;
        let token = header.strip_prefix("Bearer ").ok_or(AuthError::InvalidToken)?;

        let claims = decode_token(token, &state.config.jwt_secret)?;
        tracing::debug!(user = %claims.username, "authenticated request");
        Ok(AuthUser { claims })
    }
}

fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;
    Ok(token_data.claims)
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::auth::issue_token;

    #[test]
    fn test_token_round_trip() {
        let token = issue_token("u-1", "admin", "s3cret").unwrap();
        let claims = decode_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = issue_token("u-1", "admin", "s3cret").unwrap();
        assert!(matches!(decode_token(&token, "other"), Err(AuthError::InvalidToken)));
        assert!(matches!(decode_token("not-a-jwt", "s3cret"), Err(AuthError::InvalidToken)));
    }
}
