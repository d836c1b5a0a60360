//! Handlers for `/teams/{team_id}/statements` (distribution statements).
//!
//! Report lines are never stored as-is: bulk and import both aggregate
//! lines into one statement per track and month, with territory and
//! platform breakdowns.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use sonora_core::batching::{validate_bulk_size, BulkSummary};
use sonora_core::error::CoreError;
use sonora_core::import::statement::{map_statement_rows, missing_required_headers};
use sonora_core::statements::aggregate_statements;
use sonora_core::table::{ListQuery, Paginated};
use sonora_core::types::DbId;
use sonora_db::models::statement::{
    BulkStatementLines, Statement, StatementDetail, StatementFilters,
};
use sonora_db::repositories::StatementRepo;
use validator::Validate;

use super::{csv_export, ImportOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::team::TeamAccess;
use crate::query::{read_csv_upload, ImportParams};
use crate::response::DataResponse;
use crate::state::AppState;

const EXPORT_COLUMNS: &[(&str, &str)] = &[
    ("period", "Period"),
    ("aggregator", "Aggregator"),
    ("isrc", "ISRC"),
    ("upc", "UPC"),
    ("track_title", "Track Title"),
    ("artist_name", "Artist"),
    ("release_title", "Release Title"),
    ("total_units", "Units"),
    ("total_revenue", "Revenue"),
    ("currency", "Currency"),
];

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Statement",
        id,
    })
}

/// GET /api/v1/teams/{team_id}/statements
pub async fn list(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<StatementFilters>,
) -> AppResult<Json<DataResponse<Paginated<Statement>>>> {
    let page = StatementRepo::list(&state.pool, access.team_id, &query, &filters).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/teams/{team_id}/statements/bulk
///
/// Body: `{ "aggregator": "...", "lines": [StatementLine] }`. The summary
/// counts statements, not lines.
pub async fn bulk_create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(input): Json<BulkStatementLines>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkSummary>>)> {
    input.validate()?;
    validate_bulk_size(input.lines.len())?;

    let drafts = aggregate_statements(input.aggregator, &input.lines);
    let summary =
        StatementRepo::bulk_create_drafts(&state.pool, access.team_id, &state.config.batch, &drafts)
            .await?;
    tracing::info!(
        team_id = access.team_id,
        aggregator = %input.aggregator,
        lines = input.lines.len(),
        statements = summary.inserted,
        "Statement bulk create"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: summary })))
}

/// POST /api/v1/teams/{team_id}/statements/import?aggregator=
pub async fn import(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(params): Query<ImportParams>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    let aggregator = params.require_aggregator()?;
    let data = read_csv_upload(multipart).await?;

    let missing = missing_required_headers(aggregator, &data.header_index());
    if !missing.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Missing required columns for {}: {}",
            aggregator.label(),
            missing.join(", ")
        ))));
    }

    let mapped = map_statement_rows(aggregator, &data);
    let mut report = mapped.report;
    if mapped.rows.is_empty() {
        return Ok(Json(DataResponse {
            data: ImportOutcome::empty(report),
        }));
    }

    let drafts = aggregate_statements(aggregator, &mapped.rows);
    let summary =
        StatementRepo::bulk_create_drafts(&state.pool, access.team_id, &state.config.batch, &drafts)
            .await?;
    report.imported = mapped.rows.len();
    tracing::info!(
        team_id = access.team_id,
        aggregator = %aggregator,
        lines = report.imported,
        rejected = report.error_count,
        statements = summary.inserted,
        "Statement import"
    );

    Ok(Json(DataResponse {
        data: ImportOutcome {
            report,
            created: summary.inserted,
            batches: summary.batches,
        },
    }))
}

/// GET /api/v1/teams/{team_id}/statements/export
pub async fn export(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<StatementFilters>,
) -> AppResult<Response> {
    let rows = StatementRepo::export(&state.pool, access.team_id, &query, &filters).await?;
    csv_export("statements", EXPORT_COLUMNS, &rows)
}

/// GET /api/v1/teams/{team_id}/statements/{id}
///
/// The statement with its territory and platform breakdowns.
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<StatementDetail>>> {
    let detail = StatementRepo::find_detail(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/teams/{team_id}/statements/{id}
pub async fn delete(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    access.require_delete()?;
    if StatementRepo::delete(&state.pool, access.team_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
