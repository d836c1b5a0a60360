//! Route definitions for `/teams/{team_id}/documents`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::document;
use crate::state::AppState;

/// Routes mounted at `/teams/{team_id}/documents`.
///
/// ```text
/// GET    /                     -> list
/// POST   /upload-url           -> request_upload
/// GET    /{id}                 -> get_by_id
/// DELETE /{id}                 -> delete (row and stored object)
/// POST   /{id}/confirm         -> confirm
/// GET    /{id}/download-url    -> download_url
/// POST   /{id}/retry           -> retry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(document::list))
        .route("/upload-url", post(document::request_upload))
        .route(
            "/{id}",
            get(document::get_by_id).delete(document::delete),
        )
        .route("/{id}/confirm", post(document::confirm))
        .route("/{id}/download-url", get(document::download_url))
        .route("/{id}/retry", post(document::retry))
}
