//! Handlers for `/teams` and `/teams/{team_id}/members`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sonora_core::error::CoreError;
use sonora_core::roles::{validate_role, ROLE_MEMBER, ROLE_OWNER};
use sonora_core::types::DbId;
use sonora_db::models::team::{
    slugify, AddTeamMember, CreateTeam, Team, TeamMember, TeamMemberWithUser, TeamWithRole,
    UpdateTeam, UpdateTeamMember,
};
use sonora_db::repositories::{TeamMemberRepo, TeamRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::team::TeamAccess;
use crate::response::DataResponse;
use crate::state::AppState;

/// Attempts at a free `{slug}-{n}` before giving up.
const MAX_SLUG_ATTEMPTS: u32 = 20;

/// GET /api/v1/teams
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<TeamWithRole>>>> {
    let teams = TeamRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: teams }))
}

/// POST /api/v1/teams
///
/// The caller becomes the owner. A slug derived from the name gets a
/// numeric suffix when taken; an explicit slug that is taken is a conflict.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTeam>,
) -> AppResult<(StatusCode, Json<DataResponse<Team>>)> {
    input.validate()?;
    let name = input.name.trim();

    let slug = match input.slug.as_deref() {
        Some(explicit) => slugify(explicit),
        None => free_slug(&state, &slugify(name)).await?,
    };

    let team = TeamRepo::create_with_owner(&state.pool, name, &slug, user.user_id).await?;
    tracing::info!(team_id = team.id, user_id = user.user_id, slug = %team.slug, "Team created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: team })))
}

/// GET /api/v1/teams/{team_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
) -> AppResult<Json<DataResponse<TeamWithRole>>> {
    let team = find_team(&state, access.team_id).await?;
    Ok(Json(DataResponse {
        data: TeamWithRole {
            id: team.id,
            name: team.name,
            slug: team.slug,
            role: access.role,
            created_at: team.created_at,
            updated_at: team.updated_at,
        },
    }))
}

/// PUT /api/v1/teams/{team_id}
pub async fn update(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(input): Json<UpdateTeam>,
) -> AppResult<Json<DataResponse<Team>>> {
    access.require_manage_members()?;
    input.validate()?;
    let team = TeamRepo::update(&state.pool, access.team_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Team",
            id: access.team_id,
        }))?;
    Ok(Json(DataResponse { data: team }))
}

/// DELETE /api/v1/teams/{team_id}
///
/// Owner only. Rows go by cascade; stored objects are removed afterwards
/// and a failed object delete is only logged.
pub async fn delete(State(state): State<AppState>, access: TeamAccess) -> AppResult<StatusCode> {
    access.require_owner()?;

    let keys = TeamRepo::document_keys(&state.pool, access.team_id).await?;
    if !TeamRepo::delete(&state.pool, access.team_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Team",
            id: access.team_id,
        }));
    }

    for key in &keys {
        if let Err(e) = state.store.delete_object(key).await {
            tracing::warn!(error = %e, storage_key = %key, "Failed to delete stored object");
        }
    }
    tracing::info!(team_id = access.team_id, objects = keys.len(), "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// GET /api/v1/teams/{team_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    access: TeamAccess,
) -> AppResult<Json<DataResponse<Vec<TeamMemberWithUser>>>> {
    let members = TeamMemberRepo::list(&state.pool, access.team_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/teams/{team_id}/members
///
/// Add an existing user by email. Only an owner can add another owner.
pub async fn add_member(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(input): Json<AddTeamMember>,
) -> AppResult<(StatusCode, Json<DataResponse<TeamMember>>)> {
    access.require_manage_members()?;
    input.validate()?;

    let role = input.role.as_deref().unwrap_or(ROLE_MEMBER);
    validate_role(role)?;
    if role == ROLE_OWNER {
        access.require_owner()?;
    }

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "No registered user with email '{}'",
                input.email.trim()
            )))
        })?;

    let member = TeamMemberRepo::add(&state.pool, access.team_id, user.id, role).await?;
    tracing::info!(team_id = access.team_id, user_id = user.id, role, "Member added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// PUT /api/v1/teams/{team_id}/members/{user_id}
pub async fn update_member(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, user_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTeamMember>,
) -> AppResult<Json<DataResponse<TeamMember>>> {
    access.require_manage_members()?;
    validate_role(&input.role)?;

    let current = find_member(&state, access.team_id, user_id).await?;
    if input.role == ROLE_OWNER || current.role == ROLE_OWNER {
        access.require_owner()?;
    }
    if current.role == ROLE_OWNER && input.role != ROLE_OWNER {
        ensure_other_owner(&state, access.team_id).await?;
    }

    let member = TeamMemberRepo::update_role(&state.pool, access.team_id, user_id, &input.role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TeamMember",
            id: user_id,
        }))?;
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/v1/teams/{team_id}/members/{user_id}
///
/// Members may remove themselves; removing anyone else needs owner or
/// admin. The last owner cannot leave.
pub async fn remove_member(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if user_id != access.user.user_id {
        access.require_manage_members()?;
    }

    let current = find_member(&state, access.team_id, user_id).await?;
    if current.role == ROLE_OWNER {
        if user_id != access.user.user_id {
            access.require_owner()?;
        }
        ensure_other_owner(&state, access.team_id).await?;
    }

    TeamMemberRepo::remove(&state.pool, access.team_id, user_id).await?;
    tracing::info!(team_id = access.team_id, user_id, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_team(state: &AppState, team_id: DbId) -> AppResult<Team> {
    TeamRepo::find_by_id(&state.pool, team_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Team",
            id: team_id,
        }))
}

async fn find_member(state: &AppState, team_id: DbId, user_id: DbId) -> AppResult<TeamMember> {
    TeamMemberRepo::find(&state.pool, team_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TeamMember",
            id: user_id,
        }))
}

async fn ensure_other_owner(state: &AppState, team_id: DbId) -> AppResult<()> {
    if TeamMemberRepo::count_owners(&state.pool, team_id).await? <= 1 {
        return Err(AppError::Core(CoreError::Conflict(
            "A team must keep at least one owner".into(),
        )));
    }
    Ok(())
}

async fn free_slug(state: &AppState, base: &str) -> AppResult<String> {
    if !TeamRepo::slug_exists(&state.pool, base).await? {
        return Ok(base.to_string());
    }
    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{base}-{n}");
        if !TeamRepo::slug_exists(&state.pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Core(CoreError::Conflict(format!(
        "Team slug '{base}' is taken"
    ))))
}
