//! Health endpoint and the behaviour every route shares: request ids,
//! CORS, compression and the error envelope.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use sqlx::PgPool;
use tower::ServiceExt;

async fn send(app: axum::Router, request: Request<Body>) -> axum::http::Response<Body> {
    app.oneshot(request).await.unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_reports_database_and_mode(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["extraction_inline"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_path_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    assert_eq!(get(app, "/api/v2/teams").await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_request_id_is_generated_or_echoed(pool: PgPool) {
    let app = common::build_test_app(pool);

    let generated = get(app.clone(), "/health").await;
    let id = generated.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);

    let request = Request::get("/health")
        .header("x-request-id", "import-batch-7")
        .body(Body::empty())
        .unwrap();
    let echoed = send(app, request).await;
    assert_eq!(echoed.headers()["x-request-id"], "import-batch-7");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cors_preflight_for_configured_origin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/teams")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,authorization")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_gzip_when_accepted(pool: PgPool) {
    let app = common::build_test_app(pool);
    let request = Request::get("/health")
        .header("accept-encoding", "gzip")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.headers()["content-encoding"], "gzip");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_token_uses_error_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/teams").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json["error"].is_string());
}
