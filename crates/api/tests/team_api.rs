//! HTTP-level integration tests for teams, membership and role checks.

mod common;

use axum::http::StatusCode;
use common::{
    add_member, body_json, create_team, delete_auth, get_auth, post_json_auth, put_json_auth,
    register,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_team_makes_caller_owner(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@label.test").await;
    let team_id = create_team(&app, &token, "Discos Norte").await;

    let response = get_auth(app.clone(), &format!("/api/v1/teams/{team_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "discos-norte");
    assert_eq!(json["data"]["role"], "owner");

    let list = body_json(get_auth(app, "/api/v1/teams", &token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_derived_slug_gets_suffix_when_taken(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "slugs@label.test").await;
    create_team(&app, &token, "Same Name").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/teams",
        &token,
        serde_json::json!({ "name": "Same Name" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["slug"], "same-name-2");

    // An explicit slug that is taken is a conflict.
    let response = post_json_auth(
        app,
        "/api/v1/teams",
        &token,
        serde_json::json!({ "name": "Other", "slug": "same-name" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_member_gets_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "a@label.test").await;
    let (_, outsider) = register(&app, "b@label.test").await;
    let team_id = create_team(&app, &owner, "Private").await;

    let response = get_auth(app.clone(), &format!("/api/v1/teams/{team_id}"), &outsider).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &format!("/api/v1/teams/{team_id}/artists"), &outsider).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_member_cannot_manage_or_delete(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "own@label.test").await;
    let (_, member) = register(&app, "mem@label.test").await;
    register(&app, "third@label.test").await;
    let team_id = create_team(&app, &owner, "Roles").await;
    add_member(&app, &owner, team_id, "mem@label.test", "member").await;

    // Members can create catalog records...
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/artists"),
        &member,
        serde_json::json!({ "name": "Nadie" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let artist_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // ...but not delete them.
    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/artists/{artist_id}"),
        &member,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/members"),
        &member,
        serde_json::json!({ "email": "third@label.test" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &format!("/api/v1/teams/{team_id}"), &member).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner can delete.
    let response = delete_auth(
        app,
        &format!("/api/v1/teams/{team_id}/artists/{artist_id}"),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_cannot_add_owner(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "o@label.test").await;
    let (_, admin) = register(&app, "adm@label.test").await;
    register(&app, "new@label.test").await;
    let team_id = create_team(&app, &owner, "Admins").await;
    add_member(&app, &owner, team_id, "adm@label.test", "admin").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/members"),
        &admin,
        serde_json::json!({ "email": "new@label.test", "role": "owner" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    add_member(&app, &admin, team_id, "new@label.test", "member").await;
    let members = body_json(
        get_auth(app, &format!("/api/v1/teams/{team_id}/members"), &admin).await,
    )
    .await;
    assert_eq!(members["data"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_unknown_email_is_validation_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "solo@label.test").await;
    let team_id = create_team(&app, &owner, "Solo").await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/teams/{team_id}/members"),
        &owner,
        serde_json::json!({ "email": "nobody@label.test" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_last_owner_is_protected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner_id, owner) = register(&app, "last@label.test").await;
    let team_id = create_team(&app, &owner, "Keep").await;

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/members/{owner_id}"),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        app,
        &format!("/api/v1/teams/{team_id}/members/{owner_id}"),
        &owner,
        serde_json::json!({ "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_member_can_leave(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "boss@label.test").await;
    let (member_id, member) = register(&app, "leaver@label.test").await;
    let team_id = create_team(&app, &owner, "Leaving").await;
    add_member(&app, &owner, team_id, "leaver@label.test", "member").await;

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/members/{member_id}"),
        &member,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/teams/{team_id}"), &member).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_deletes_team(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "del@label.test").await;
    let team_id = create_team(&app, &owner, "Gone").await;

    let response = delete_auth(app.clone(), &format!("/api/v1/teams/{team_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/teams/{team_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
