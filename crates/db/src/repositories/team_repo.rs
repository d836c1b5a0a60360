//! Repository for the `teams` table.

use sqlx::PgPool;
use sonora_core::roles::ROLE_OWNER;
use sonora_core::types::DbId;

use crate::models::team::{Team, TeamWithRole, UpdateTeam};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides CRUD operations for teams.
pub struct TeamRepo;

impl TeamRepo {
    /// Create a team and make `owner_id` its owner, in one transaction.
    pub async fn create_with_owner(
        pool: &PgPool,
        name: &str,
        slug: &str,
        owner_id: DbId,
    ) -> Result<Team, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO teams (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(team.id)
            .bind(owner_id)
            .bind(ROLE_OWNER)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(team)
    }

    /// Find a team by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a slug is already taken.
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE slug = $1)")
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// Teams the user belongs to, with the user's role in each.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<TeamWithRole>, sqlx::Error> {
        sqlx::query_as::<_, TeamWithRole>(
            "SELECT t.id, t.name, t.slug, m.role, t.created_at, t.updated_at
             FROM teams t
             JOIN team_members m ON m.team_id = t.id
             WHERE m.user_id = $1
             ORDER BY t.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Update a team. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTeam,
    ) -> Result<Option<Team>, sqlx::Error> {
        let query = format!(
            "UPDATE teams SET name = COALESCE($2, name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a team and, by cascade, everything it owns.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Storage keys of every document in the team (for object cleanup).
    pub async fn document_keys(pool: &PgPool, id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT storage_key FROM documents WHERE team_id = $1")
            .bind(id)
            .fetch_all(pool)
            .await
    }
}
