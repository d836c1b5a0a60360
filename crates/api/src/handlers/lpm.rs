//! Handlers for `/teams/{team_id}/lpm` (LPM product records).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use sonora_core::batching::{validate_bulk_size, BulkSummary};
use sonora_core::error::CoreError;
use sonora_core::identifiers::{validate_isrc, validate_upc};
use sonora_core::import::lpm::{map_lpm_row, LPM_COLUMNS};
use sonora_core::import::{export_columns, map_rows};
use sonora_core::table::{ListQuery, Paginated};
use sonora_core::types::DbId;
use sonora_db::models::lpm_product::{CreateLpmProduct, LpmFilters, LpmProduct, UpdateLpmProduct};
use sonora_db::repositories::LpmProductRepo;
use validator::Validate;

use super::{csv_export, row_into, validated_row, BulkRequest, ImportOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::team::TeamAccess;
use crate::query::{read_csv_upload, ImportParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "LpmProduct",
        id,
    })
}

/// Normalize the UPC (required) and ISRC (optional) in place.
fn normalize(input: &mut CreateLpmProduct) -> Result<(), CoreError> {
    input.upc = validate_upc(&input.upc)?;
    if let Some(isrc) = input.isrc.as_deref() {
        input.isrc = Some(validate_isrc(isrc)?);
    }
    Ok(())
}

/// GET /api/v1/teams/{team_id}/lpm
pub async fn list(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<LpmFilters>,
) -> AppResult<Json<DataResponse<Paginated<LpmProduct>>>> {
    let page = LpmProductRepo::list(&state.pool, access.team_id, &query, &filters).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/teams/{team_id}/lpm
pub async fn create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(mut input): Json<CreateLpmProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<LpmProduct>>)> {
    normalize(&mut input)?;
    input.validate()?;
    let product = LpmProductRepo::create(&state.pool, access.team_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// POST /api/v1/teams/{team_id}/lpm/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(mut input): Json<BulkRequest<CreateLpmProduct>>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkSummary>>)> {
    validate_bulk_size(input.records.len())?;
    for (i, record) in input.records.iter_mut().enumerate() {
        normalize(record).map_err(|e| {
            AppError::Core(CoreError::Validation(format!("Record {}: {e}", i + 1)))
        })?;
    }
    input.validate_each()?;

    let summary =
        LpmProductRepo::bulk_create(&state.pool, access.team_id, &state.config.batch, &input.records)
            .await?;
    tracing::info!(
        team_id = access.team_id,
        inserted = summary.inserted,
        batches = summary.batches,
        "LPM bulk create"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: summary })))
}

/// POST /api/v1/teams/{team_id}/lpm/import
///
/// Multipart CSV upload. `?aggregator=` only picks the date order.
pub async fn import(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(params): Query<ImportParams>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    let order = params.date_order()?;
    let data = read_csv_upload(multipart).await?;

    let mapped = map_rows(&data, |index, record| {
        let row = map_lpm_row(index, record, order)?;
        let mut input: CreateLpmProduct = row_into(row.fields)?;
        input.artists = row.artists;
        validated_row(input)
    });

    if mapped.rows.is_empty() {
        return Ok(Json(DataResponse {
            data: ImportOutcome::empty(mapped.report),
        }));
    }

    let summary =
        LpmProductRepo::bulk_create(&state.pool, access.team_id, &state.config.batch, &mapped.rows)
            .await?;
    tracing::info!(
        team_id = access.team_id,
        rows = mapped.report.total_rows,
        inserted = summary.inserted,
        rejected = mapped.report.error_count,
        "LPM import"
    );
    Ok(Json(DataResponse {
        data: ImportOutcome::from_rows(mapped.report, summary),
    }))
}

/// GET /api/v1/teams/{team_id}/lpm/export
pub async fn export(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<LpmFilters>,
) -> AppResult<Response> {
    let rows = LpmProductRepo::export(&state.pool, access.team_id, &query, &filters).await?;
    let mut columns = export_columns(LPM_COLUMNS);
    columns.push(("artists", "Artists"));
    csv_export("lpm", &columns, &rows)
}

/// GET /api/v1/teams/{team_id}/lpm/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<LpmProduct>>> {
    let product = LpmProductRepo::find_by_id(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: product }))
}

/// PUT /api/v1/teams/{team_id}/lpm/{id}
pub async fn update(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateLpmProduct>,
) -> AppResult<Json<DataResponse<LpmProduct>>> {
    input.validate()?;
    if let Some(upc) = input.upc.as_deref() {
        input.upc = Some(validate_upc(upc)?);
    }
    if let Some(isrc) = input.isrc.as_deref() {
        input.isrc = Some(validate_isrc(isrc)?);
    }
    let product = LpmProductRepo::update(&state.pool, access.team_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/teams/{team_id}/lpm/{id}
pub async fn delete(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    access.require_delete()?;
    if LpmProductRepo::delete(&state.pool, access.team_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
