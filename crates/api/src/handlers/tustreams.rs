//! Handlers for `/teams/{team_id}/tustreams` (TuStreams report records).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use sonora_core::aggregator::Aggregator;
use sonora_core::batching::{validate_bulk_size, BulkSummary};
use sonora_core::error::CoreError;
use sonora_core::identifiers::{normalize_isrc, normalize_upc};
use sonora_core::import::statement::missing_required_headers;
use sonora_core::import::map_rows;
use sonora_core::import::tustreams::{map_tustreams_row, TustreamsLine};
use sonora_core::table::{ListQuery, Paginated};
use sonora_core::types::DbId;
use sonora_db::models::tustreams::{
    CreateTustreamsRecord, TustreamsFilters, TustreamsRecord, UpdateTustreamsRecord,
};
use sonora_db::repositories::TustreamsRepo;
use validator::Validate;

use super::{csv_export, validated_row, BulkRequest, ImportOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::team::TeamAccess;
use crate::query::read_csv_upload;
use crate::response::DataResponse;
use crate::state::AppState;

const EXPORT_COLUMNS: &[(&str, &str)] = &[
    ("period", "Periodo"),
    ("platform", "Plataforma"),
    ("country", "País"),
    ("isrc", "ISRC"),
    ("upc", "UPC"),
    ("track_title", "Canción"),
    ("artist_name", "Artista"),
    ("release_title", "Álbum"),
    ("streams", "Reproducciones"),
    ("downloads", "Descargas"),
    ("revenue", "Ingresos"),
    ("currency", "Moneda"),
];

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TustreamsRecord",
        id,
    })
}

/// Keep valid identifiers in canonical form and drop invalid ones, the
/// same way report imports treat them.
fn normalize(input: &mut CreateTustreamsRecord) {
    input.isrc = input.isrc.as_deref().and_then(normalize_isrc);
    input.upc = input.upc.as_deref().and_then(normalize_upc);
}

fn from_line(line: TustreamsLine) -> CreateTustreamsRecord {
    CreateTustreamsRecord {
        period: line.period,
        platform: line.platform,
        country: Some(line.country),
        isrc: line.isrc,
        upc: line.upc,
        track_title: line.track_title,
        artist_name: line.artist_name,
        release_title: line.release_title,
        streams: Some(line.streams),
        downloads: Some(line.downloads),
        revenue: Some(line.revenue),
        currency: Some(line.currency),
    }
}

/// GET /api/v1/teams/{team_id}/tustreams
pub async fn list(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<TustreamsFilters>,
) -> AppResult<Json<DataResponse<Paginated<TustreamsRecord>>>> {
    let page = TustreamsRepo::list(&state.pool, access.team_id, &query, &filters).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/teams/{team_id}/tustreams
pub async fn create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(mut input): Json<CreateTustreamsRecord>,
) -> AppResult<(StatusCode, Json<DataResponse<TustreamsRecord>>)> {
    input.validate()?;
    normalize(&mut input);
    let record = TustreamsRepo::create(&state.pool, access.team_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /api/v1/teams/{team_id}/tustreams/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(mut input): Json<BulkRequest<CreateTustreamsRecord>>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkSummary>>)> {
    validate_bulk_size(input.records.len())?;
    input.validate_each()?;
    input.records.iter_mut().for_each(normalize);

    let summary =
        TustreamsRepo::bulk_create(&state.pool, access.team_id, &state.config.batch, &input.records)
            .await?;
    tracing::info!(team_id = access.team_id, inserted = summary.inserted, "TuStreams bulk create");
    Ok((StatusCode::CREATED, Json(DataResponse { data: summary })))
}

/// POST /api/v1/teams/{team_id}/tustreams/import
///
/// Always read with the TuStreams report layout.
pub async fn import(
    State(state): State<AppState>,
    access: TeamAccess,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    let data = read_csv_upload(multipart).await?;

    let missing = missing_required_headers(Aggregator::TuStreams, &data.header_index());
    if !missing.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Missing required columns: {}",
            missing.join(", ")
        ))));
    }

    let mapped = map_rows(&data, |index, record| {
        let line = map_tustreams_row(index, record)?;
        validated_row(from_line(line))
    });
    if mapped.rows.is_empty() {
        return Ok(Json(DataResponse {
            data: ImportOutcome::empty(mapped.report),
        }));
    }

    let summary =
        TustreamsRepo::bulk_create(&state.pool, access.team_id, &state.config.batch, &mapped.rows)
            .await?;
    tracing::info!(
        team_id = access.team_id,
        rows = mapped.report.total_rows,
        inserted = summary.inserted,
        rejected = mapped.report.error_count,
        "TuStreams import"
    );
    Ok(Json(DataResponse {
        data: ImportOutcome::from_rows(mapped.report, summary),
    }))
}

/// GET /api/v1/teams/{team_id}/tustreams/export
pub async fn export(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<TustreamsFilters>,
) -> AppResult<Response> {
    let rows = TustreamsRepo::export(&state.pool, access.team_id, &query, &filters).await?;
    csv_export("tustreams", EXPORT_COLUMNS, &rows)
}

/// GET /api/v1/teams/{team_id}/tustreams/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<TustreamsRecord>>> {
    let record = TustreamsRepo::find_by_id(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: record }))
}

/// PUT /api/v1/teams/{team_id}/tustreams/{id}
pub async fn update(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateTustreamsRecord>,
) -> AppResult<Json<DataResponse<TustreamsRecord>>> {
    input.validate()?;
    input.isrc = input.isrc.as_deref().and_then(normalize_isrc);
    input.upc = input.upc.as_deref().and_then(normalize_upc);
    let record = TustreamsRepo::update(&state.pool, access.team_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: record }))
}

/// DELETE /api/v1/teams/{team_id}/tustreams/{id}
pub async fn delete(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    access.require_delete()?;
    if TustreamsRepo::delete(&state.pool, access.team_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
