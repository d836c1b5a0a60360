//! The `/api/v1` route tree. Each `router()` is mounted by its parent;
//! handlers live in [`crate::handlers`].

pub mod catalog;
pub mod document;
pub mod health;
pub mod statement;
pub mod team;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                    register (public)
/// /auth/login                                       login (public)
/// /auth/refresh                                     refresh (public)
/// /auth/logout                                      logout (requires auth)
/// /auth/me                                          current user
///
/// /teams                                            list, create
/// /teams/{team_id}                                  get, update, delete
/// /teams/{team_id}/members                          list, add
/// /teams/{team_id}/members/{user_id}                update role, remove
/// /teams/{team_id}/stats                            dashboard overview
///
/// /teams/{team_id}/artists                          list, create
/// /teams/{team_id}/artists/{id}                     get, update, delete
///
/// /teams/{team_id}/lpm                              list, create
/// /teams/{team_id}/lpm/bulk                         bulk create (POST)
/// /teams/{team_id}/lpm/import                       CSV import (POST, multipart)
/// /teams/{team_id}/lpm/export                       CSV export (GET)
/// /teams/{team_id}/lpm/{id}                         get, update, delete
///
/// /teams/{team_id}/isrc-songs                       same layout as /lpm
/// /teams/{team_id}/tustreams                        same layout as /lpm
///
/// /teams/{team_id}/statements                       list
/// /teams/{team_id}/statements/bulk                  bulk create from lines (POST)
/// /teams/{team_id}/statements/import                CSV import (POST, ?aggregator=)
/// /teams/{team_id}/statements/export                CSV export (GET)
/// /teams/{team_id}/statements/{id}                  get with breakdowns, delete
///
/// /teams/{team_id}/contracts                        list, create
/// /teams/{team_id}/contracts/export                 CSV export (GET)
/// /teams/{team_id}/contracts/{id}                   get, update, delete
///
/// /teams/{team_id}/documents                        list
/// /teams/{team_id}/documents/upload-url             presigned upload (POST)
/// /teams/{team_id}/documents/{id}                   get, delete
/// /teams/{team_id}/documents/{id}/confirm           mark uploaded (POST)
/// /teams/{team_id}/documents/{id}/download-url      presigned download (GET)
/// /teams/{team_id}/documents/{id}/retry             retry extraction (POST)
/// ```
pub fn api_routes(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/teams", team::router(max_import_bytes))
}

/// Register, login and refresh are public; logout and me need a token.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
