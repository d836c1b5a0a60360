#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sonora_api::auth::tokens::JwtConfig;
use sonora_api::config::{ExtractionMode, ServerConfig, DEFAULT_MAX_IMPORT_BYTES};
use sonora_api::router::build_app_router;
use sonora_api::state::AppState;
use sonora_cloud::{CloudError, ObjectStore};
use sonora_core::batching::BatchConfig;
use sonora_core::types::DbId;
use sonora_worker::{JobProcessor, JobQueue};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-42";

/// Config for tests: external extraction mode and a batch size of 2 so
/// bulk tests cross chunk boundaries with a handful of rows.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
        extraction_mode: ExtractionMode::External,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        batch: BatchConfig {
            batch_size: 2,
            timeout: Duration::from_secs(30),
        },
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// In-memory object store that hands out fake presigned URLs.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn presign_put(&self, key: &str, _content_type: &str, ttl: Duration) -> Result<String, CloudError> {
        Ok(format!("https://storage.test/{key}?op=put&ttl={}", ttl.as_secs()))
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, CloudError> {
        Ok(format!("https://storage.test/{key}?op=get&ttl={}", ttl.as_secs()))
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, CloudError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| CloudError::Storage(format!("no such key: {key}")))
    }

    async fn delete_object(&self, key: &str) -> Result<(), CloudError> {
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// Processor that reports every document it is handed.
pub struct ForwardingProcessor(pub mpsc::UnboundedSender<DbId>);

#[async_trait]
impl JobProcessor for ForwardingProcessor {
    async fn process(&self, document_id: DbId) {
        let _ = self.0.send(document_id);
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with all middleware layers, using the
/// given database pool and a fresh in-memory store.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_store(pool).0
}

/// Like [`build_test_app`], also returning the store for assertions.
pub fn build_test_app_with_store(pool: PgPool) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        store: store.clone(),
        extraction_queue: None,
    };
    (build_app_router(state), store)
}

/// App with an in-process extraction queue whose jobs arrive on the
/// returned receiver.
pub fn build_test_app_with_queue(pool: PgPool) -> (Router, mpsc::UnboundedReceiver<DbId>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let queue = JobQueue::start(Arc::new(ForwardingProcessor(tx)));
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        store: Arc::new(MemoryStore::default()),
        extraction_queue: Some(Arc::new(queue)),
    };
    (build_app_router(state), rx)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Build a request carrying an optional bearer token and optional JSON body.
fn request(method: Method, uri: &str, token: Option<&str>, json: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match json {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// POST a CSV file as the `file` part of a multipart form.
pub async fn post_csv_auth(app: Router, uri: &str, token: &str, csv: &str) -> Response<Body> {
    let boundary = "sonora-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"import.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    let collected = response.into_body().collect().await.unwrap();
    collected.to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("response is not JSON ({e}): {}", String::from_utf8_lossy(&bytes)))
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8_lossy(&body_bytes(response).await).into_owned()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Register a user through the API and return `(user_id, access_token)`.
pub async fn register(app: &Router, email: &str) -> (DbId, String) {
    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        serde_json::json!({ "email": email, "name": "Test User", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["user"]["id"].as_i64().unwrap();
    let token = json["data"]["access_token"].as_str().unwrap().to_string();
    (id, token)
}

/// Create a team owned by `token`'s user and return its id.
pub async fn create_team(app: &Router, token: &str, name: &str) -> DbId {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/teams",
        token,
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Add a registered user to a team with the given role.
pub async fn add_member(app: &Router, owner_token: &str, team_id: DbId, email: &str, role: &str) {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/teams/{team_id}/members"),
        owner_token,
        serde_json::json!({ "email": email, "role": role }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
