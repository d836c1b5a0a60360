//! Handlers for `/teams/{team_id}/contracts`.
//!
//! Contracts are created by extraction from an uploaded document, or
//! entered by hand through `create`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use sonora_core::error::CoreError;
use sonora_core::table::{ListQuery, Paginated};
use sonora_core::types::{Date, DbId};
use sonora_db::models::contract::{Contract, ContractFilters, CreateContract, UpdateContract};
use sonora_db::repositories::ContractRepo;
use validator::Validate;

use super::csv_export;
use crate::error::{AppError, AppResult};
use crate::middleware::team::TeamAccess;
use crate::response::DataResponse;
use crate::state::AppState;

const EXPORT_COLUMNS: &[(&str, &str)] = &[
    ("title", "Title"),
    ("counterparty", "Counterparty"),
    ("contract_type", "Type"),
    ("status", "Status"),
    ("start_date", "Start Date"),
    ("end_date", "End Date"),
    ("signed_date", "Signed Date"),
    ("auto_renewal", "Auto Renewal"),
    ("royalty_rate", "Royalty Rate"),
    ("advance_amount", "Advance"),
    ("currency", "Currency"),
    ("territories", "Territories"),
    ("term_months", "Term (months)"),
    ("summary", "Summary"),
];

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Contract",
        id,
    })
}

fn check_dates(start: Option<Date>, end: Option<Date>) -> AppResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::Core(CoreError::Validation(
            "end_date must not be before start_date".into(),
        ))),
        _ => Ok(()),
    }
}

/// GET /api/v1/teams/{team_id}/contracts
pub async fn list(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ContractFilters>,
) -> AppResult<Json<DataResponse<Paginated<Contract>>>> {
    let page = ContractRepo::list(&state.pool, access.team_id, &query, &filters).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/teams/{team_id}/contracts
pub async fn create(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(input): Json<CreateContract>,
) -> AppResult<(StatusCode, Json<DataResponse<Contract>>)> {
    input.validate()?;
    check_dates(input.start_date, input.end_date)?;
    let contract = ContractRepo::create(&state.pool, access.team_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: contract })))
}

/// GET /api/v1/teams/{team_id}/contracts/export
pub async fn export(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ContractFilters>,
) -> AppResult<Response> {
    let rows = ContractRepo::export(&state.pool, access.team_id, &query, &filters).await?;
    csv_export("contracts", EXPORT_COLUMNS, &rows)
}

/// GET /api/v1/teams/{team_id}/contracts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Contract>>> {
    let contract = ContractRepo::find_by_id(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: contract }))
}

/// PUT /api/v1/teams/{team_id}/contracts/{id}
///
/// Manual corrections after extraction.
pub async fn update(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateContract>,
) -> AppResult<Json<DataResponse<Contract>>> {
    input.validate()?;
    let current = ContractRepo::find_by_id(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    check_dates(
        input.start_date.or(current.start_date),
        input.end_date.or(current.end_date),
    )?;

    let contract = ContractRepo::update(&state.pool, access.team_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: contract }))
}

/// DELETE /api/v1/teams/{team_id}/contracts/{id}
pub async fn delete(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    access.require_delete()?;
    if ContractRepo::delete(&state.pool, access.team_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
