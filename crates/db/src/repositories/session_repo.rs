//! Repository for `user_sessions`, the refresh-token store.
//!
//! Tokens are single-use. [`SessionRepo::spend`] revokes the presented
//! token in the same statement that validates it, so two concurrent
//! refreshes cannot both succeed.

use sqlx::PgPool;
use sonora_core::types::DbId;

use crate::models::session::{CreateSession, RefreshLookup, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, replaced_by, \
                       last_used_at, user_agent, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    /// Start a session for a fresh login.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Consume a presented refresh token.
    pub async fn spend(pool: &PgPool, token_hash: &str) -> Result<RefreshLookup, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET is_revoked = true, last_used_at = NOW()
             WHERE refresh_token_hash = $1 AND is_revoked = false AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        if let Some(session) = sqlx::query_as::<_, UserSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await?
        {
            return Ok(RefreshLookup::Spent(session));
        }

        let replayed: Option<DbId> = sqlx::query_scalar(
            "SELECT user_id FROM user_sessions
             WHERE refresh_token_hash = $1 AND replaced_by IS NOT NULL",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;
        Ok(match replayed {
            Some(user_id) => RefreshLookup::Replayed { user_id },
            None => RefreshLookup::Invalid,
        })
    }

    /// Insert the successor of a spent session and link the two.
    pub async fn rotate(
        pool: &PgPool,
        spent: &UserSession,
        input: &CreateSession,
    ) -> Result<UserSession, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let next = sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .fetch_one(&mut *tx)
            .await?;
        sqlx::query("UPDATE user_sessions SET replaced_by = $2 WHERE id = $1")
            .bind(spent.id)
            .bind(next.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(next)
    }

    /// Revoke every live session of a user. Returns how many were live.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired sessions. Revoked ones are kept until they expire so
    /// a replayed token is still recognized.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
