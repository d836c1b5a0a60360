//! Route definitions for `/teams` and everything scoped to a team.

use axum::routing::{get, put};
use axum::Router;

use super::{catalog, document, statement};
use crate::handlers::{contract, stats, team};
use crate::state::AppState;

/// Routes mounted at `/teams`.
///
/// ```text
/// GET    /                               -> list
/// POST   /                               -> create
/// GET    /{team_id}                      -> get_by_id
/// PUT    /{team_id}                      -> update
/// DELETE /{team_id}                      -> delete (owner)
///
/// GET    /{team_id}/members              -> list_members
/// POST   /{team_id}/members              -> add_member
/// PUT    /{team_id}/members/{user_id}    -> update_member
/// DELETE /{team_id}/members/{user_id}    -> remove_member
///
/// GET    /{team_id}/stats                -> stats::overview
/// ```
///
/// Catalog, statement, contract and document routes nest under
/// `/{team_id}`.
pub fn router(max_import_bytes: usize) -> Router<AppState> {
    let contract_routes = Router::new()
        .route("/", get(contract::list).post(contract::create))
        .route("/export", get(contract::export))
        .route(
            "/{id}",
            get(contract::get_by_id)
                .put(contract::update)
                .delete(contract::delete),
        );

    Router::new()
        .route("/", get(team::list).post(team::create))
        .route(
            "/{team_id}",
            get(team::get_by_id).put(team::update).delete(team::delete),
        )
        .route(
            "/{team_id}/members",
            get(team::list_members).post(team::add_member),
        )
        .route(
            "/{team_id}/members/{user_id}",
            put(team::update_member).delete(team::remove_member),
        )
        .route("/{team_id}/stats", get(stats::overview))
        .nest("/{team_id}/artists", catalog::artist_router())
        .nest("/{team_id}/lpm", catalog::lpm_router(max_import_bytes))
        .nest("/{team_id}/isrc-songs", catalog::isrc_song_router(max_import_bytes))
        .nest("/{team_id}/tustreams", catalog::tustreams_router(max_import_bytes))
        .nest("/{team_id}/statements", statement::router(max_import_bytes))
        .nest("/{team_id}/contracts", contract_routes)
        .nest("/{team_id}/documents", document::router())
}
