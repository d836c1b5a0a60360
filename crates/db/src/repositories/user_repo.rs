//! Repository for `users`, including the login counters.

use sqlx::PgPool;
use sonora_core::types::DbId;

use crate::models::user::{CreateUser, FailedLogin, User};

const COLUMNS: &str = "id, email, name, password_hash, is_active, failed_login_count, \
                       locked_until, last_login_at, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a user. A taken email (any case) violates `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query).bind(id).fetch_optional(pool).await
    }

    /// Case-insensitive lookup.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Count a failed login and lock the account for `lock_secs` once the
    /// count reaches `max_failures`. A lock that has already run out
    /// restarts the count.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_failures: i32,
        lock_secs: i64,
    ) -> Result<FailedLogin, sqlx::Error> {
        sqlx::query_as::<_, FailedLogin>(
            "WITH counted AS (
                SELECT id,
                       CASE WHEN locked_until IS NOT NULL AND locked_until <= NOW()
                            THEN 1 ELSE failed_login_count + 1 END AS attempts
                FROM users WHERE id = $1
                FOR UPDATE
             )
             UPDATE users u SET
                failed_login_count = c.attempts,
                locked_until = CASE
                    WHEN c.attempts >= $2 THEN NOW() + ($3::double precision * INTERVAL '1 second')
                    WHEN u.locked_until <= NOW() THEN NULL
                    ELSE u.locked_until
                END
             FROM counted c
             WHERE u.id = c.id
             RETURNING u.failed_login_count, u.locked_until",
        )
        .bind(id)
        .bind(max_failures)
        .bind(lock_secs)
        .fetch_one(pool)
        .await
    }

    /// Reset the counters and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users
             SET failed_login_count = 0, locked_until = NULL, last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
