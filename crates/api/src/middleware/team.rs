//! Team membership extractor.
//!
//! Every catalog route lives under `/teams/{team_id}`. [`TeamAccess`]
//! authenticates the caller, reads `team_id` from the path and loads the
//! caller's membership. Non-members get 404 rather than 403 so team ids do
//! not leak.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use sonora_core::error::CoreError;
use sonora_core::roles;
use sonora_core::types::DbId;
use sonora_db::repositories::TeamMemberRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated member of the team in the request path.
#[derive(Debug, Clone)]
pub struct TeamAccess {
    pub user: AuthUser,
    pub team_id: DbId,
    /// `owner`, `admin` or `member`.
    pub role: String,
}

impl TeamAccess {
    /// Deleting catalog records needs owner or admin.
    pub fn require_delete(&self) -> Result<(), AppError> {
        self.require(roles::can_delete_records(&self.role), "Only owners and admins can delete records")
    }

    pub fn require_manage_members(&self) -> Result<(), AppError> {
        self.require(roles::can_manage_members(&self.role), "Only owners and admins can manage members")
    }

    pub fn require_owner(&self) -> Result<(), AppError> {
        self.require(roles::can_delete_team(&self.role), "Only the team owner can do this")
    }

    fn require(&self, allowed: bool, message: &str) -> Result<(), AppError> {
        if allowed {
            Ok(())
        } else {
            tracing::debug!(
                user_id = self.user.user_id,
                team_id = self.team_id,
                role = %self.role,
                "Team permission denied"
            );
            Err(AppError::Core(CoreError::Forbidden(message.to_string())))
        }
    }
}

impl FromRequestParts<AppState> for TeamAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let team_id: DbId = params
            .get("team_id")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| AppError::BadRequest("Invalid team id".into()))?;

        let membership = TeamMemberRepo::find(&state.pool, team_id, user.user_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Team",
                id: team_id,
            }))?;

        Ok(TeamAccess {
            user,
            team_id,
            role: membership.role,
        })
    }
}
