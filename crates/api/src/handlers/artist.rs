//! Handlers for `/teams/{team_id}/artists`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sonora_core::error::CoreError;
use sonora_core::table::{ListQuery, Paginated};
use sonora_core::types::DbId;
use sonora_db::models::artist::{Artist, ArtistFilters, CreateArtist, UpdateArtist};
use sonora_db::repositories::ArtistRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::team::TeamAccess;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Artist",
        id,
    })
}

/// GET /api/v1/teams/{team_id}/artists
pub async fn list(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ArtistFilters>,
) -> AppResult<Json<DataResponse<Paginated<Artist>>>> {
    let page = ArtistRepo::list(&state.pool, access.team_id, &query, &filters).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/teams/{team_id}/artists
pub async fn create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(input): Json<CreateArtist>,
) -> AppResult<(StatusCode, Json<DataResponse<Artist>>)> {
    input.validate()?;
    let artist = ArtistRepo::create(&state.pool, access.team_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: artist })))
}

/// GET /api/v1/teams/{team_id}/artists/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Artist>>> {
    let artist = ArtistRepo::find_by_id(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: artist }))
}

/// PUT /api/v1/teams/{team_id}/artists/{id}
pub async fn update(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateArtist>,
) -> AppResult<Json<DataResponse<Artist>>> {
    input.validate()?;
    let artist = ArtistRepo::update(&state.pool, access.team_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: artist }))
}

/// DELETE /api/v1/teams/{team_id}/artists/{id}
pub async fn delete(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    access.require_delete()?;
    if ArtistRepo::delete(&state.pool, access.team_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
