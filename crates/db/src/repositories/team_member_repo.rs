//! Repository for the `team_members` table.

use sqlx::PgPool;
use sonora_core::roles::ROLE_OWNER;
use sonora_core::types::DbId;

use crate::models::team::{TeamMember, TeamMemberWithUser};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, user_id, role, created_at, updated_at";

/// Provides membership lookups and changes.
pub struct TeamMemberRepo;

impl TeamMemberRepo {
    /// The user's membership in a team, if any.
    pub async fn find(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<Option<TeamMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM team_members WHERE team_id = $1 AND user_id = $2");
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(team_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Members of a team with their user details, owners first.
    pub async fn list(pool: &PgPool, team_id: DbId) -> Result<Vec<TeamMemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, TeamMemberWithUser>(
            "SELECT m.id, m.team_id, m.user_id, m.role, u.email, u.name, m.created_at
             FROM team_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.team_id = $1
             ORDER BY CASE m.role WHEN 'owner' THEN 0 WHEN 'admin' THEN 1 ELSE 2 END, u.name",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    /// Add a member. Fails with a `uq_team_members_team_user` violation if
    /// the user is already in the team.
    pub async fn add(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<TeamMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_members (team_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(team_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Change a member's role.
    pub async fn update_role(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<Option<TeamMember>, sqlx::Error> {
        let query = format!(
            "UPDATE team_members SET role = $3
             WHERE team_id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(team_id)
            .bind(user_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Remove a member. Returns `true` if a row was deleted.
    pub async fn remove(pool: &PgPool, team_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of owners in a team.
    pub async fn count_owners(pool: &PgPool, team_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM team_members WHERE team_id = $1 AND role = $2")
            .bind(team_id)
            .bind(ROLE_OWNER)
            .fetch_one(pool)
            .await
    }
}
