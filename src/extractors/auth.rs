use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::{auth, AppError, AppState};

/// Extracts the access token from the Authorization header, falling back to
/// the `access_token` cookie set by the web client.
fn extract_token_from_request(parts: &Parts) -> Option<String> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    if let Some(cookie_header) = parts.headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            // Parse cookies manually (cookie = "name=value; name2=value2")
            for cookie in cookie_str.split(';') {
                if let Some(value) = cookie.trim().strip_prefix("access_token=") {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Identity of the caller, resolved from an already-issued access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = extract_token_from_request(parts).ok_or_else(|| {
            AppError::Unauthorized("Missing authentication: no Authorization header or access_token cookie".to_string())
        })?;

        let claims = auth::validate_jwt(&token, &state.config.jwt_secret, state.config.jwt_issuer.as_deref())
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AppError::Unauthorized(e)
            })?;

        let user_id = claims.user_id().map_err(AppError::Unauthorized)?;

        tracing::debug!(user_id, role = ?claims.role, "Request authenticated");
        Ok(AuthenticatedUser { user_id })
    }
}
