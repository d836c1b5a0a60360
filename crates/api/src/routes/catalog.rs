//! Route definitions for the catalog tables: artists, LPM products, ISRC
//! songs and TuStreams records.
//!
//! The three importable tables share one layout:
//!
//! ```text
//! GET    /          -> list
//! POST   /          -> create
//! POST   /bulk      -> bulk_create
//! POST   /import    -> import (multipart CSV, body limit applies)
//! GET    /export    -> export
//! GET    /{id}      -> get_by_id
//! PUT    /{id}      -> update
//! DELETE /{id}      -> delete
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{artist, isrc_song, lpm, tustreams};
use crate::state::AppState;

/// Routes mounted at `/teams/{team_id}/artists`.
pub fn artist_router() -> Router<AppState> {
    Router::new()
        .route("/", get(artist::list).post(artist::create))
        .route(
            "/{id}",
            get(artist::get_by_id)
                .put(artist::update)
                .delete(artist::delete),
        )
}

/// Routes mounted at `/teams/{team_id}/lpm`.
pub fn lpm_router(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(lpm::list).post(lpm::create))
        .route("/bulk", post(lpm::bulk_create))
        .route(
            "/import",
            post(lpm::import).layer(DefaultBodyLimit::max(max_import_bytes)),
        )
        .route("/export", get(lpm::export))
        .route(
            "/{id}",
            get(lpm::get_by_id).put(lpm::update).delete(lpm::delete),
        )
}

/// Routes mounted at `/teams/{team_id}/isrc-songs`.
pub fn isrc_song_router(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(isrc_song::list).post(isrc_song::create))
        .route("/bulk", post(isrc_song::bulk_create))
        .route(
            "/import",
            post(isrc_song::import).layer(DefaultBodyLimit::max(max_import_bytes)),
        )
        .route("/export", get(isrc_song::export))
        .route(
            "/{id}",
            get(isrc_song::get_by_id)
                .put(isrc_song::update)
                .delete(isrc_song::delete),
        )
}

/// Routes mounted at `/teams/{team_id}/tustreams`.
pub fn tustreams_router(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(tustreams::list).post(tustreams::create))
        .route("/bulk", post(tustreams::bulk_create))
        .route(
            "/import",
            post(tustreams::import).layer(DefaultBodyLimit::max(max_import_bytes)),
        )
        .route("/export", get(tustreams::export))
        .route(
            "/{id}",
            get(tustreams::get_by_id)
                .put(tustreams::update)
                .delete(tustreams::delete),
        )
}
