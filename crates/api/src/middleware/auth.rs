//! Bearer-token authentication.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sonora_core::error::CoreError;
use sonora_core::types::DbId;

use crate::auth::tokens::decode_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a valid access token.
///
/// Decoded once per request; later extractors read it back from the
/// request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub email: String,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// The token of an `Authorization: Bearer <token>` header. The scheme is
/// case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized("Malformed Authorization header"))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(unauthorized("Expected 'Authorization: Bearer <token>'")),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers)?;
        let claims = decode_access_token(&state.config.jwt, token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            unauthorized("Invalid or expired token")
        })?;

        let user = AuthUser {
            user_id: claims.sub,
            email: claims.email,
        };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
