//! Route definitions for `/teams/{team_id}/statements`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::statement;
use crate::state::AppState;

/// Routes mounted at `/teams/{team_id}/statements`.
///
/// ```text
/// GET    /          -> list
/// POST   /bulk      -> bulk_create (aggregator + lines)
/// POST   /import    -> import (multipart CSV, ?aggregator= required)
/// GET    /export    -> export
/// GET    /{id}      -> get_by_id (with territories and platforms)
/// DELETE /{id}      -> delete
/// ```
pub fn router(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(statement::list))
        .route("/bulk", post(statement::bulk_create))
        .route(
            "/import",
            post(statement::import).layer(DefaultBodyLimit::max(max_import_bytes)),
        )
        .route("/export", get(statement::export))
        .route(
            "/{id}",
            get(statement::get_by_id).delete(statement::delete),
        )
}
