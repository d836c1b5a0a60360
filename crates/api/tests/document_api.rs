//! Integration tests for presigned document uploads and the extraction
//! hand-off.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, create_team, delete_auth, get_auth, post_auth, post_json_auth, register};
use sonora_db::repositories::DocumentRepo;
use sqlx::PgPool;

fn upload_body(file_name: &str, content_type: &str, kind: &str) -> serde_json::Value {
    serde_json::json!({
        "file_name": file_name,
        "content_type": content_type,
        "size_bytes": 2048,
        "kind": kind,
    })
}

/// Request an upload URL, returning the document JSON and the URL.
async fn request_upload(app: &Router, token: &str, team_id: i64, body: serde_json::Value) -> (serde_json::Value, String) {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/documents/upload-url"),
        token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let url = json["data"]["upload_url"].as_str().unwrap().to_string();
    (json["data"]["document"].clone(), url)
}

/// The object key embedded in a test presigned URL.
fn key_from_url(url: &str) -> String {
    let path = url.strip_prefix("https://storage.test/").unwrap();
    path.split('?').next().unwrap().to_string()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_url_issues_team_scoped_key(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "docs@label.test").await;
    let team_id = create_team(&app, &token, "Docs").await;

    let (document, url) = request_upload(
        &app,
        &token,
        team_id,
        upload_body("Contrato Sony 2023.pdf", "application/pdf", "contract"),
    )
    .await;
    assert_eq!(document["status"], "uploading");
    assert_eq!(document["kind"], "contract");
    assert_eq!(document["name"], "Contrato Sony 2023.pdf");
    assert!(document.get("storage_key").is_none());

    let key = key_from_url(&url);
    assert!(key.starts_with(&format!("teams/{team_id}/documents/")));
    assert!(key.ends_with("/Contrato_Sony_2023.pdf"));
    assert!(url.contains("op=put"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_rejects_bad_types(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "docs@label.test").await;
    let team_id = create_team(&app, &token, "Docs").await;
    let uri = format!("/api/v1/teams/{team_id}/documents/upload-url");

    let response = post_json_auth(app.clone(), &uri, &token, upload_body("deal.png", "image/png", "contract")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(app, &uri, &token, upload_body("deal.zip", "application/zip", "general")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confirm_general_document_completes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "docs@label.test").await;
    let team_id = create_team(&app, &token, "Docs").await;
    let (document, _) =
        request_upload(&app, &token, team_id, upload_body("royalties.csv", "text/csv", "general")).await;
    let base = format!("/api/v1/teams/{team_id}/documents/{}", document["id"]);

    // Not uploaded yet.
    let response = get_auth(app.clone(), &format!("{base}/download-url"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_auth(app.clone(), &format!("{base}/confirm"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "completed");
    assert!(!json["data"]["uploaded_at"].is_null());

    let response = post_auth(app.clone(), &format!("{base}/confirm"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(app, &format!("{base}/download-url"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["url"].as_str().unwrap().contains("op=get"));
    assert_eq!(json["data"]["expires_in"], 900);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confirm_contract_queues_extraction(pool: PgPool) {
    let (app, mut jobs) = common::build_test_app_with_queue(pool);
    let (_, token) = register(&app, "docs@label.test").await;
    let team_id = create_team(&app, &token, "Docs").await;
    let (document, _) =
        request_upload(&app, &token, team_id, upload_body("deal.pdf", "application/pdf", "contract")).await;
    let id = document["id"].as_i64().unwrap();

    let response = post_auth(app, &format!("/api/v1/teams/{team_id}/documents/{id}/confirm"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "pending");

    let queued = tokio::time::timeout(Duration::from_secs(5), jobs.recv())
        .await
        .expect("document was not queued");
    assert_eq!(queued, Some(id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_retry_only_failed_contracts(pool: PgPool) {
    let (app, mut jobs) = common::build_test_app_with_queue(pool.clone());
    let (_, token) = register(&app, "docs@label.test").await;
    let team_id = create_team(&app, &token, "Docs").await;

    let (general, _) =
        request_upload(&app, &token, team_id, upload_body("notes.txt", "text/plain", "general")).await;
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/documents/{}/retry", general["id"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (contract, _) =
        request_upload(&app, &token, team_id, upload_body("deal.pdf", "application/pdf", "contract")).await;
    let id = contract["id"].as_i64().unwrap();
    let retry_uri = format!("/api/v1/teams/{team_id}/documents/{id}/retry");

    let response = post_auth(app.clone(), &retry_uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    DocumentRepo::mark_failed(&pool, id, "boom").await.unwrap();
    let failed = body_json(get_auth(app.clone(), &format!("/api/v1/teams/{team_id}/documents/{id}"), &token).await).await;
    assert_eq!(failed["data"]["status"], "error");
    assert_eq!(failed["data"]["error_message"], "boom");

    let response = post_auth(app, &retry_uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["error_message"].is_null());

    let queued = tokio::time::timeout(Duration::from_secs(5), jobs.recv()).await.unwrap();
    assert_eq!(queued, Some(id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_stored_object(pool: PgPool) {
    let (app, store) = common::build_test_app_with_store(pool);
    let (_, token) = register(&app, "docs@label.test").await;
    let team_id = create_team(&app, &token, "Docs").await;
    let (document, url) =
        request_upload(&app, &token, team_id, upload_body("deal.pdf", "application/pdf", "general")).await;
    let uri = format!("/api/v1/teams/{team_id}/documents/{}", document["id"]);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(*store.deleted.lock().unwrap(), vec![key_from_url(&url)]);

    let response = get_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_kind(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "docs@label.test").await;
    let team_id = create_team(&app, &token, "Docs").await;
    request_upload(&app, &token, team_id, upload_body("a.pdf", "application/pdf", "contract")).await;
    request_upload(&app, &token, team_id, upload_body("b.csv", "text/csv", "general")).await;
    request_upload(&app, &token, team_id, upload_body("c.pdf", "application/pdf", "general")).await;

    let base = format!("/api/v1/teams/{team_id}/documents");
    let all = body_json(get_auth(app.clone(), &base, &token).await).await;
    assert_eq!(all["data"]["total"], 3);

    let contracts = body_json(get_auth(app.clone(), &format!("{base}?kind=contract"), &token).await).await;
    assert_eq!(contracts["data"]["total"], 1);
    assert_eq!(contracts["data"]["items"][0]["file_name"], "a.pdf");

    let sorted = body_json(get_auth(app, &format!("{base}?sort=file_name&dir=desc"), &token).await).await;
    assert_eq!(sorted["data"]["items"][0]["file_name"], "c.pdf");
}
