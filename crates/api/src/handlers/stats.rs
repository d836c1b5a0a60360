//! Dashboard figures for a team.

use axum::extract::State;
use axum::Json;
use sonora_db::models::stats::TeamOverview;
use sonora_db::repositories::StatsRepo;

use crate::error::AppResult;
use crate::middleware::team::TeamAccess;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/teams/{team_id}/stats
pub async fn overview(
    State(state): State<AppState>,
    access: TeamAccess,
) -> AppResult<Json<DataResponse<TeamOverview>>> {
    let overview = StatsRepo::team_overview(&state.pool, access.team_id).await?;
    Ok(Json(DataResponse { data: overview }))
}
