//! Access and refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs. Refresh tokens are opaque and
//! single-use; the server keeps only their SHA-256 digest in
//! `user_sessions`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sonora_core::types::DbId;
use uuid::Uuid;

use crate::config::env_or;

/// `iss` claim of every access token this server signs.
pub const TOKEN_ISSUER: &str = "sonora";

/// Payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (15) and
    /// `JWT_REFRESH_EXPIRY_DAYS` (7).
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is missing or blank.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .expect("JWT_SECRET must be set to a non-empty value");
        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_expiry_days)
    }
}

/// Sign an access token for `user_id`.
pub fn issue_access_token(
    config: &JwtConfig,
    user_id: DbId,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        iat,
        exp: iat + config.access_ttl_secs(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer of an access token.
pub fn decode_access_token(
    config: &JwtConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// A freshly minted refresh token. `secret` goes to the client once.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub secret: String,
    pub digest: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let digest = Self::digest_of(&secret);
        Self { secret, digest }
    }

    /// Hex SHA-256 of a presented token, as stored.
    pub fn digest_of(secret: &str) -> String {
        format!("{:x}", Sha256::digest(secret.trim().as_bytes()))
    }
}
