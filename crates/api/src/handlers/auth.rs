//! Handlers for `/auth`: register, login, refresh, logout and me.

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sonora_core::error::CoreError;
use sonora_db::models::session::{CreateSession, RefreshLookup, UserSession};
use sonora_db::models::user::{CreateUser, User, UserResponse};
use sonora_db::repositories::{SessionRepo, UserRepo};
use validator::Validate;

use crate::auth::credentials::{
    burn_verification, check_new_password, hash_password, verify_password, LOCKOUT_SECS,
    MAX_FAILED_LOGINS,
};
use crate::auth::tokens::{issue_access_token, RefreshToken};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Stored user agents are cut to this many characters.
const MAX_USER_AGENT_CHARS: usize = 300;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair plus the signed-in user.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

fn ensure_active(user: &User) -> AppResult<()> {
    if user.is_active {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden("Account is deactivated".into())))
    }
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_CHARS).collect())
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    input.validate()?;
    let email = input.email.trim().to_lowercase();
    check_new_password(&input.password, &email)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            name: input.name.trim().to_string(),
            password_hash,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    let session = issue_session(&state, &user, None, user_agent(&headers)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// POST /api/v1/auth/login
///
/// Every failure answers "Invalid email or password". After
/// [`MAX_FAILED_LOGINS`] failures in a row the account is locked for
/// [`LOCKOUT_SECS`] and login answers 403 until then.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let Some(user) = UserRepo::find_by_email(&state.pool, &input.email).await? else {
        burn_verification(&input.password);
        return Err(unauthorized("Invalid email or password"));
    };
    ensure_active(&user)?;
    if user.is_locked_at(Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Stored password hash is unreadable: {e}")))?;
    if !matches {
        let failed =
            UserRepo::record_failed_login(&state.pool, user.id, MAX_FAILED_LOGINS, LOCKOUT_SECS)
                .await?;
        if let Some(until) = failed.locked_until {
            tracing::warn!(user_id = user.id, attempts = failed.failed_login_count, %until, "Account locked");
        }
        return Err(unauthorized("Invalid email or password"));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    let session = issue_session(&state, &user, None, user_agent(&headers)).await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/auth/refresh
///
/// Trades a refresh token for a new pair. Each refresh token works once;
/// replaying a rotated one signs the user out everywhere.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let digest = RefreshToken::digest_of(&input.refresh_token);
    let spent = match SessionRepo::spend(&state.pool, &digest).await? {
        RefreshLookup::Spent(session) => session,
        RefreshLookup::Replayed { user_id } => {
            let revoked = SessionRepo::revoke_all_for_user(&state.pool, user_id).await?;
            tracing::warn!(user_id, revoked, "Rotated refresh token replayed; sessions revoked");
            return Err(unauthorized("Invalid or expired refresh token"));
        }
        RefreshLookup::Invalid => return Err(unauthorized("Invalid or expired refresh token")),
    };

    let user = UserRepo::find_by_id(&state.pool, spent.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;
    ensure_active(&user)?;

    let session = issue_session(&state, &user, Some(&spent), user_agent(&headers)).await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/auth/logout
///
/// Ends every session of the caller.
pub async fn logout(State(state): State<AppState>, caller: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, caller.user_id).await?;
    tracing::info!(user_id = caller.user_id, revoked, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, caller.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// Sign an access token and store a new refresh session, chained to
/// `previous` when rotating.
async fn issue_session(
    state: &AppState,
    user: &User,
    previous: Option<&UserSession>,
    user_agent: Option<String>,
) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = issue_access_token(jwt, user.id, &user.email)
        .map_err(|e| AppError::InternalError(format!("Token signing failed: {e}")))?;

    let refresh = RefreshToken::generate();
    let input = CreateSession {
        user_id: user.id,
        refresh_token_hash: refresh.digest,
        expires_at: Utc::now() + jwt.refresh_ttl(),
        user_agent,
    };
    match previous {
        Some(spent) => SessionRepo::rotate(&state.pool, spent, &input).await?,
        None => SessionRepo::create(&state.pool, &input).await?,
    };

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.secret,
        expires_in: jwt.access_ttl_secs(),
        user: UserResponse::from(user),
    })
}
