//! Repository for the `artists` table.

use sqlx::{PgConnection, PgPool};
use sonora_core::table::{resolve_sort, ListQuery, Paginated};
use sonora_core::types::DbId;

use crate::error::DbError;
use crate::filter::{fetch_page, BindValue, Filter};
use crate::models::artist::{Artist, ArtistFilters, CreateArtist, UpdateArtist};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, name, spotify_id, apple_music_id, country, created_at, updated_at";

/// Columns a list may be sorted by.
pub const SORT_COLUMNS: &[&str] = &["name", "country", "created_at", "updated_at"];

/// Provides CRUD operations for artists.
pub struct ArtistRepo;

impl ArtistRepo {
    /// Insert a new artist, returning the created row.
    pub async fn create(pool: &PgPool, team_id: DbId, input: &CreateArtist) -> Result<Artist, sqlx::Error> {
        let query = format!(
            "INSERT INTO artists (team_id, name, spotify_id, apple_music_id, country)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Artist>(&query)
            .bind(team_id)
            .bind(input.name.trim())
            .bind(&input.spotify_id)
            .bind(&input.apple_music_id)
            .bind(input.country.as_deref().map(str::to_uppercase))
            .fetch_one(pool)
            .await
    }

    /// Find an artist by ID within a team.
    pub async fn find_by_id(pool: &PgPool, team_id: DbId, id: DbId) -> Result<Option<Artist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM artists WHERE team_id = $1 AND id = $2");
        sqlx::query_as::<_, Artist>(&query)
            .bind(team_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of artists matching the query.
    pub async fn list(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &ArtistFilters,
    ) -> Result<Paginated<Artist>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "name")?;
        let mut filter = Filter::for_team(team_id);
        filter
            .eq_opt(
                "country",
                filters.country.as_ref().map(|c| BindValue::Text(c.to_uppercase())),
            )
            .search(&["name"], query.search_pattern());

        let page = query.page();
        let (items, total) = fetch_page(pool, COLUMNS, "artists", &filter, sort, query.dir(), page).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Update an artist. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
        input: &UpdateArtist,
    ) -> Result<Option<Artist>, sqlx::Error> {
        let query = format!(
            "UPDATE artists SET
                name = COALESCE($3, name),
                spotify_id = COALESCE($4, spotify_id),
                apple_music_id = COALESCE($5, apple_music_id),
                country = COALESCE($6, country)
             WHERE team_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Artist>(&query)
            .bind(team_id)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.spotify_id)
            .bind(&input.apple_music_id)
            .bind(input.country.as_deref().map(str::to_uppercase))
            .fetch_optional(pool)
            .await
    }

    /// Delete an artist. Links to products and songs go with it.
    pub async fn delete(pool: &PgPool, team_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM artists WHERE team_id = $1 AND id = $2")
            .bind(team_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve artist names to IDs, creating missing artists.
    ///
    /// Matching is case-insensitive; the returned IDs follow the order of
    /// `names` with duplicates removed.
    pub async fn resolve_names(pool: &PgPool, team_id: DbId, names: &[String]) -> Result<Vec<DbId>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::resolve_names_in(&mut conn, team_id, names).await
    }

    /// [`Self::resolve_names`] on an existing connection or transaction.
    pub async fn resolve_names_in(
        conn: &mut PgConnection,
        team_id: DbId,
        names: &[String],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut ids: Vec<DbId> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let id: DbId = sqlx::query_scalar(
                "INSERT INTO artists (team_id, name) VALUES ($1, $2)
                 ON CONFLICT (team_id, LOWER(name)) DO UPDATE SET name = artists.name
                 RETURNING id",
            )
            .bind(team_id)
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
