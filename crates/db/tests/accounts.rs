//! Users, login counters and refresh-token sessions.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use sonora_db::models::session::{CreateSession, RefreshLookup};
use sonora_db::models::user::{CreateUser, User};
use sonora_db::repositories::{SessionRepo, UserRepo};

async fn new_user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: "Ana".to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
}

fn session_for(user: &User, hash: &str, ttl: Duration) -> CreateSession {
    CreateSession {
        user_id: user.id,
        refresh_token_hash: hash.to_string(),
        expires_at: Utc::now() + ttl,
        user_agent: Some("tests".to_string()),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_lookup_ignores_case(pool: PgPool) {
    let user = new_user(&pool, "Ana@Label.test").await;
    let found = UserRepo::find_by_email(&pool, " ana@label.TEST ").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);

    let err = UserRepo::create(
        &pool,
        &CreateUser {
            email: "ANA@label.test".into(),
            name: "Dup".into(),
            password_hash: "hash".into(),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(e) if e.constraint() == Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failures_lock_then_success_resets(pool: PgPool) {
    let user = new_user(&pool, "lock@label.test").await;

    for attempt in 1..=2 {
        let state = UserRepo::record_failed_login(&pool, user.id, 3, 900).await.unwrap();
        assert_eq!(state.failed_login_count, attempt);
        assert!(state.locked_until.is_none());
    }
    let state = UserRepo::record_failed_login(&pool, user.id, 3, 900).await.unwrap();
    let until = state.locked_until.expect("third failure locks");
    assert!(until > Utc::now() + Duration::minutes(14));

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(reloaded.is_locked_at(Utc::now()));

    UserRepo::record_successful_login(&pool, user.id).await.unwrap();
    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.failed_login_count, 0);
    assert!(reloaded.locked_until.is_none());
    assert!(reloaded.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_lock_restarts_the_count(pool: PgPool) {
    let user = new_user(&pool, "again@label.test").await;
    sqlx::query("UPDATE users SET failed_login_count = 5, locked_until = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let state = UserRepo::record_failed_login(&pool, user.id, 5, 900).await.unwrap();
    assert_eq!(state.failed_login_count, 1);
    assert!(state.locked_until.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_token_is_single_use(pool: PgPool) {
    let user = new_user(&pool, "tokens@label.test").await;
    SessionRepo::create(&pool, &session_for(&user, "first", Duration::days(7)))
        .await
        .unwrap();

    let spent = match SessionRepo::spend(&pool, "first").await.unwrap() {
        RefreshLookup::Spent(session) => session,
        other => panic!("expected a live session, got {other:?}"),
    };
    assert!(spent.is_revoked);
    assert!(spent.last_used_at.is_some());

    // Spent but never rotated: just invalid.
    assert_matches!(SessionRepo::spend(&pool, "first").await.unwrap(), RefreshLookup::Invalid);

    let next = SessionRepo::rotate(&pool, &spent, &session_for(&user, "second", Duration::days(7)))
        .await
        .unwrap();
    assert!(!next.is_revoked);

    assert_matches!(
        SessionRepo::spend(&pool, "first").await.unwrap(),
        RefreshLookup::Replayed { user_id } if user_id == user.id
    );
    assert_matches!(SessionRepo::spend(&pool, "unknown").await.unwrap(), RefreshLookup::Invalid);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_sessions_are_invalid_and_purged(pool: PgPool) {
    let user = new_user(&pool, "old@label.test").await;
    SessionRepo::create(&pool, &session_for(&user, "stale", Duration::minutes(-1)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session_for(&user, "live", Duration::days(1)))
        .await
        .unwrap();

    assert_matches!(SessionRepo::spend(&pool, "stale").await.unwrap(), RefreshLookup::Invalid);
    assert_eq!(SessionRepo::cleanup_expired(&pool).await.unwrap(), 1);

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 1);
    assert_matches!(SessionRepo::spend(&pool, "live").await.unwrap(), RefreshLookup::Invalid);
}
