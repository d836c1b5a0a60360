//! `GET /health`, outside `/api/v1` and unauthenticated.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// This process runs contract extraction itself.
    pub extraction_inline: bool,
    /// Contracts waiting in the in-process queue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_backlog: Option<usize>,
}

/// 200 when healthy, 503 when degraded, same body either way.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = match sonora_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };
    let code = if db_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let body = HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        extraction_inline: state.extraction_queue.is_some(),
        extraction_backlog: state.extraction_queue.as_ref().map(|q| q.backlog()),
    };
    (code, Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
