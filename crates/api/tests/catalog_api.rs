//! HTTP-level integration tests for the catalog tables: artists, LPM
//! products, ISRC songs, TuStreams records, contracts and team stats.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_team, delete_auth, get_auth, post_json_auth, put_json_auth, register,
};
use sqlx::PgPool;

async fn setup(pool: PgPool) -> (axum::Router, String, i64) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "catalog@label.test").await;
    let team_id = create_team(&app, &token, "Catalog").await;
    (app, token, team_id)
}

// ---------------------------------------------------------------------------
// Artists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_artist_crud(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;
    let base = format!("/api/v1/teams/{team_id}/artists");

    let response = post_json_auth(
        app.clone(),
        &base,
        &token,
        serde_json::json!({ "name": "La Nuit", "country": "FR" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("{base}/{id}"),
        &token,
        serde_json::json!({ "name": "La Nuit Blanche" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "La Nuit Blanche");

    let response = post_json_auth(
        app.clone(),
        &base,
        &token,
        serde_json::json!({ "name": "La Nuit Blanche" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(app.clone(), &format!("{base}/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("{base}/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// LPM products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lpm_create_normalizes_identifiers_and_links_artists(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/lpm"),
        &token,
        serde_json::json!({
            "upc": "0-36000-29145-2",
            "isrc": "es-a01-17-00123",
            "release_title": "El Mal Querer",
            "track_title": "Malamente",
            "release_date": "2018-11-02",
            "artists": ["Rosalía"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["upc"], "036000291452");
    assert_eq!(json["data"]["isrc"], "ESA011700123");
    assert_eq!(json["data"]["artists"], serde_json::json!(["Rosalía"]));

    let artists = body_json(
        get_auth(app, &format!("/api/v1/teams/{team_id}/artists"), &token).await,
    )
    .await;
    assert_eq!(artists["data"]["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lpm_rejects_bad_upc(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/teams/{team_id}/lpm"),
        &token,
        serde_json::json!({ "upc": "036000291453" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lpm_bulk_create_runs_in_batches(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/lpm/bulk"),
        &token,
        serde_json::json!({ "records": [
            { "upc": "036000291452", "track_title": "One" },
            { "upc": "036000291452", "track_title": "Two" },
            { "upc": "4006381333931", "track_title": "Three" }
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["requested"], 3);
    assert_eq!(json["data"]["inserted"], 3);
    // The test config uses chunks of two.
    assert_eq!(json["data"]["batches"], 2);

    let page = body_json(
        get_auth(
            app,
            &format!("/api/v1/teams/{team_id}/lpm?upc=036000291452&sort=track_title&dir=asc"),
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(page["data"]["total"], 2);
    assert_eq!(page["data"]["items"][0]["track_title"], "One");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lpm_bulk_names_the_bad_record(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/teams/{team_id}/lpm/bulk"),
        &token,
        serde_json::json!({ "records": [
            { "upc": "036000291452" },
            { "upc": "12345" }
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Record 2"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_pagination_search_and_sort_whitelist(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;
    let base = format!("/api/v1/teams/{team_id}/lpm");
    for title in ["Alba", "Brisa", "Cumbre"] {
        let response = post_json_auth(
            app.clone(),
            &base,
            &token,
            serde_json::json!({ "upc": "012345678905", "release_title": title }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let page = body_json(
        get_auth(app.clone(), &format!("{base}?page=2&page_size=2&sort=release_title"), &token).await,
    )
    .await;
    assert_eq!(page["data"]["total"], 3);
    assert_eq!(page["data"]["total_pages"], 2);
    assert_eq!(page["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"]["items"][0]["release_title"], "Cumbre");

    let found = body_json(get_auth(app.clone(), &format!("{base}?search=bris"), &token).await).await;
    assert_eq!(found["data"]["total"], 1);

    let response = get_auth(app, &format!("{base}?sort=team_id;drop"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_records_are_scoped_to_their_team(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;
    let other_team = create_team(&app, &token, "Other").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/lpm"),
        &token,
        serde_json::json!({ "upc": "036000291452" }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/teams/{other_team}/lpm/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &format!("/api/v1/teams/{other_team}/lpm/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// ISRC songs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_isrc_duplicate_create_conflicts_but_bulk_skips(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;
    let base = format!("/api/v1/teams/{team_id}/isrc-songs");

    let response = post_json_auth(
        app.clone(),
        &base,
        &token,
        serde_json::json!({ "isrc": "US-RC1-76-07839", "title": "Original" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["isrc"], "USRC17607839");

    let response = post_json_auth(
        app.clone(),
        &base,
        &token,
        serde_json::json!({ "isrc": "USRC17607839", "title": "Copy" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        app,
        &format!("{base}/bulk"),
        &token,
        serde_json::json!({ "records": [
            { "isrc": "USRC17607839", "title": "Copy" },
            { "isrc": "ESA011700123", "title": "New" }
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["requested"], 2);
    assert_eq!(json["data"]["inserted"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_isrc_rejects_malformed_code(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/teams/{team_id}/isrc-songs"),
        &token,
        serde_json::json!({ "isrc": "12RC17607839", "title": "Bad" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// TuStreams
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tustreams_create_and_update(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;
    let base = format!("/api/v1/teams/{team_id}/tustreams");

    let response = post_json_auth(
        app.clone(),
        &base,
        &token,
        serde_json::json!({
            "period": "2024-01-01",
            "platform": "Spotify",
            "country": "AR",
            "isrc": "ARF012300001",
            "streams": 1500,
            "revenue": 4.2
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("{base}/{id}"),
        &token,
        serde_json::json!({ "downloads": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["downloads"], 3);
    assert_eq!(json["data"]["streams"], 1500);
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contract_crud_and_date_order(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;
    let base = format!("/api/v1/teams/{team_id}/contracts");

    let response = post_json_auth(
        app.clone(),
        &base,
        &token,
        serde_json::json!({
            "title": "Distribution agreement",
            "start_date": "2024-05-01",
            "end_date": "2024-01-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &base,
        &token,
        serde_json::json!({
            "title": "Distribution agreement",
            "counterparty": "Virgin",
            "royalty_rate": 0.8,
            "currency": "eur",
            "territories": ["ES", "MX"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["status"], "draft");

    let response = put_json_auth(
        app.clone(),
        &format!("{base}/{id}"),
        &token,
        serde_json::json!({ "status": "active", "royalty_rate": 0.75 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "active");

    let page = body_json(get_auth(app.clone(), &format!("{base}?status=active"), &token).await).await;
    assert_eq!(page["data"]["total"], 1);

    let response = put_json_auth(
        app,
        &format!("{base}/{id}"),
        &token,
        serde_json::json!({ "royalty_rate": 1.5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_overview_counts(pool: PgPool) {
    let (app, token, team_id) = setup(pool).await;

    post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/lpm"),
        &token,
        serde_json::json!({ "upc": "036000291452", "artists": ["Uno", "Dos"] }),
    )
    .await;

    let response = get_auth(app, &format!("/api/v1/teams/{team_id}/stats"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["counts"]["lpm_products"], 1);
    assert_eq!(json["data"]["counts"]["artists"], 2);
    assert_eq!(json["data"]["counts"]["documents"], 0);
    assert!(json["data"]["monthly_revenue"].is_array());
}
