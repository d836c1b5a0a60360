//! Refresh-token sessions.

use sqlx::FromRow;
use sonora_core::types::{DbId, Timestamp};

/// A row from `user_sessions`. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    /// Session this one was rotated into.
    pub replaced_by: Option<DbId>,
    pub last_used_at: Option<Timestamp>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
}

/// What presenting a refresh token found.
#[derive(Debug, Clone)]
pub enum RefreshLookup {
    /// Live token, now spent. The caller must issue its successor.
    Spent(UserSession),
    /// Token was already rotated: someone is replaying it.
    Replayed { user_id: DbId },
    /// Unknown, expired or revoked without a successor.
    Invalid,
}
