//! Handlers for `/teams/{team_id}/isrc-songs`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use sonora_core::batching::{validate_bulk_size, BulkSummary};
use sonora_core::error::CoreError;
use sonora_core::identifiers::validate_isrc;
use sonora_core::import::isrc::{map_isrc_row, ISRC_SONG_COLUMNS};
use sonora_core::import::{export_columns, map_rows};
use sonora_core::table::{ListQuery, Paginated};
use sonora_core::types::DbId;
use sonora_db::models::isrc_song::{CreateIsrcSong, IsrcSong, IsrcSongFilters, UpdateIsrcSong};
use sonora_db::repositories::IsrcSongRepo;
use validator::Validate;

use super::{csv_export, row_into, validated_row, BulkRequest, ImportOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::team::TeamAccess;
use crate::query::{read_csv_upload, ImportParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "IsrcSong",
        id,
    })
}

/// GET /api/v1/teams/{team_id}/isrc-songs
pub async fn list(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<IsrcSongFilters>,
) -> AppResult<Json<DataResponse<Paginated<IsrcSong>>>> {
    let page = IsrcSongRepo::list(&state.pool, access.team_id, &query, &filters).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/teams/{team_id}/isrc-songs
pub async fn create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(mut input): Json<CreateIsrcSong>,
) -> AppResult<(StatusCode, Json<DataResponse<IsrcSong>>)> {
    input.isrc = validate_isrc(&input.isrc)?;
    input.validate()?;
    let song = IsrcSongRepo::create(&state.pool, access.team_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: song })))
}

/// POST /api/v1/teams/{team_id}/isrc-songs/bulk
///
/// ISRCs already present in the team are skipped, not updated.
pub async fn bulk_create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(mut input): Json<BulkRequest<CreateIsrcSong>>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkSummary>>)> {
    validate_bulk_size(input.records.len())?;
    for (i, record) in input.records.iter_mut().enumerate() {
        record.isrc = validate_isrc(&record.isrc).map_err(|e| {
            AppError::Core(CoreError::Validation(format!("Record {}: {e}", i + 1)))
        })?;
    }
    input.validate_each()?;

    let summary =
        IsrcSongRepo::bulk_create(&state.pool, access.team_id, &state.config.batch, &input.records)
            .await?;
    tracing::info!(
        team_id = access.team_id,
        requested = summary.requested,
        inserted = summary.inserted,
        "ISRC bulk create"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: summary })))
}

/// POST /api/v1/teams/{team_id}/isrc-songs/import
pub async fn import(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(params): Query<ImportParams>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    let order = params.date_order()?;
    let data = read_csv_upload(multipart).await?;

    let mapped = map_rows(&data, |index, record| {
        let row = map_isrc_row(index, record, order)?;
        let mut input: CreateIsrcSong = row_into(row.fields)?;
        input.artists = row.artists;
        validated_row(input)
    });

    if mapped.rows.is_empty() {
        return Ok(Json(DataResponse {
            data: ImportOutcome::empty(mapped.report),
        }));
    }

    let summary =
        IsrcSongRepo::bulk_create(&state.pool, access.team_id, &state.config.batch, &mapped.rows)
            .await?;
    tracing::info!(
        team_id = access.team_id,
        rows = mapped.report.total_rows,
        inserted = summary.inserted,
        rejected = mapped.report.error_count,
        "ISRC import"
    );
    Ok(Json(DataResponse {
        data: ImportOutcome::from_rows(mapped.report, summary),
    }))
}

/// GET /api/v1/teams/{team_id}/isrc-songs/export
pub async fn export(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<IsrcSongFilters>,
) -> AppResult<Response> {
    let rows = IsrcSongRepo::export(&state.pool, access.team_id, &query, &filters).await?;
    let mut columns = export_columns(ISRC_SONG_COLUMNS);
    columns.push(("artists", "Artists"));
    csv_export("isrc-songs", &columns, &rows)
}

/// GET /api/v1/teams/{team_id}/isrc-songs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<IsrcSong>>> {
    let song = IsrcSongRepo::find_by_id(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: song }))
}

/// PUT /api/v1/teams/{team_id}/isrc-songs/{id}
pub async fn update(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateIsrcSong>,
) -> AppResult<Json<DataResponse<IsrcSong>>> {
    input.validate()?;
    if let Some(isrc) = input.isrc.as_deref() {
        input.isrc = Some(validate_isrc(isrc)?);
    }
    let song = IsrcSongRepo::update(&state.pool, access.team_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: song }))
}

/// DELETE /api/v1/teams/{team_id}/isrc-songs/{id}
pub async fn delete(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    access.require_delete()?;
    if IsrcSongRepo::delete(&state.pool, access.team_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
