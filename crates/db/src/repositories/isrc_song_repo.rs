//! Repository for the `isrc_songs` table and its artist links.

use sqlx::{PgConnection, PgPool};
use sonora_core::batching::{BatchConfig, BulkSummary};
use sonora_core::table::{resolve_sort, ListQuery, Paginated, MAX_EXPORT_ROWS};
use sonora_core::types::DbId;

use crate::bulk::run_in_batches;
use crate::error::DbError;
use crate::filter::{fetch_for_export, fetch_page, BindValue, Filter};
use crate::models::isrc_song::{CreateIsrcSong, IsrcSong, IsrcSongFilters, UpdateIsrcSong};
use crate::repositories::ArtistRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, isrc, title, version, duration_seconds, genre, language, \
                       release_date, label, explicit, iswc, composers, publisher, notes, \
                       COALESCE((SELECT array_agg(a.name ORDER BY a.name) \
                       FROM isrc_song_artists sa JOIN artists a ON a.id = sa.artist_id \
                       WHERE sa.isrc_song_id = isrc_songs.id), '{}') AS artists, \
                       created_at, updated_at";

/// Columns a list may be sorted by.
pub const SORT_COLUMNS: &[&str] = &[
    "isrc",
    "title",
    "duration_seconds",
    "genre",
    "language",
    "release_date",
    "label",
    "created_at",
    "updated_at",
];

const SEARCH_COLUMNS: &[&str] = &["isrc", "title", "version", "label", "composers", "publisher"];

/// Provides CRUD and bulk operations for ISRC songs.
pub struct IsrcSongRepo;

impl IsrcSongRepo {
    /// Insert a song and link its artists. A duplicate ISRC within the team
    /// fails with a `uq_isrc_songs_team_isrc` violation.
    pub async fn create(pool: &PgPool, team_id: DbId, input: &CreateIsrcSong) -> Result<IsrcSong, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = Self::insert_row(&mut tx, team_id, input).await?;
        Self::replace_artists(&mut tx, team_id, id, &input.artists).await?;
        let song = Self::find_in(&mut tx, team_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;
        Ok(song)
    }

    /// Find a song by ID within a team.
    pub async fn find_by_id(pool: &PgPool, team_id: DbId, id: DbId) -> Result<Option<IsrcSong>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::find_in(&mut conn, team_id, id).await
    }

    /// One page of songs matching the query.
    pub async fn list(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &IsrcSongFilters,
    ) -> Result<Paginated<IsrcSong>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "created_at")?;
        let filter = build_filter(team_id, query, filters);
        let page = query.page();
        let (items, total) = fetch_page(pool, COLUMNS, "isrc_songs", &filter, sort, query.dir(), page).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Every song matching the query (capped), for CSV export.
    pub async fn export(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &IsrcSongFilters,
    ) -> Result<Vec<IsrcSong>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "created_at")?;
        let filter = build_filter(team_id, query, filters);
        Ok(fetch_for_export(pool, COLUMNS, "isrc_songs", &filter, sort, query.dir(), MAX_EXPORT_ROWS).await?)
    }

    /// Update a song. Only non-`None` fields in `input` are applied;
    /// `artists`, when present, replaces every link.
    pub async fn update(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
        input: &UpdateIsrcSong,
    ) -> Result<Option<IsrcSong>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE isrc_songs SET
                isrc = COALESCE($3, isrc),
                title = COALESCE($4, title),
                version = COALESCE($5, version),
                duration_seconds = COALESCE($6, duration_seconds),
                genre = COALESCE($7, genre),
                language = COALESCE($8, language),
                release_date = COALESCE($9, release_date),
                label = COALESCE($10, label),
                explicit = COALESCE($11, explicit),
                iswc = COALESCE($12, iswc),
                composers = COALESCE($13, composers),
                publisher = COALESCE($14, publisher),
                notes = COALESCE($15, notes)
             WHERE team_id = $1 AND id = $2
             RETURNING id",
        )
        .bind(team_id)
        .bind(id)
        .bind(&input.isrc)
        .bind(&input.title)
        .bind(&input.version)
        .bind(input.duration_seconds)
        .bind(&input.genre)
        .bind(&input.language)
        .bind(input.release_date)
        .bind(&input.label)
        .bind(input.explicit)
        .bind(&input.iswc)
        .bind(&input.composers)
        .bind(&input.publisher)
        .bind(&input.notes)
        .fetch_optional(&mut *tx)
        .await?;
        if updated.is_none() {
            return Ok(None);
        }

        if let Some(artists) = &input.artists {
            Self::replace_artists(&mut tx, team_id, id, artists).await?;
        }
        let song = Self::find_in(&mut tx, team_id, id).await?;
        tx.commit().await?;
        Ok(song)
    }

    /// Delete a song. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, team_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM isrc_songs WHERE team_id = $1 AND id = $2")
            .bind(team_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert many songs, `config.batch_size` per transaction.
    ///
    /// Songs whose ISRC already exists in the team are skipped rather than
    /// failing the chunk; the summary counts only new rows.
    pub async fn bulk_create(
        pool: &PgPool,
        team_id: DbId,
        config: &BatchConfig,
        inputs: &[CreateIsrcSong],
    ) -> Result<BulkSummary, DbError> {
        run_in_batches(config, inputs, |_, chunk| Self::insert_chunk(pool, team_id, chunk)).await
    }

    async fn insert_chunk(pool: &PgPool, team_id: DbId, chunk: &[CreateIsrcSong]) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;
        for input in chunk {
            let id: Option<DbId> = sqlx::query_scalar(&insert_query("ON CONFLICT (team_id, isrc) DO NOTHING"))
                .bind(team_id)
                .bind(&input.isrc)
                .bind(&input.title)
                .bind(&input.version)
                .bind(input.duration_seconds)
                .bind(&input.genre)
                .bind(&input.language)
                .bind(input.release_date)
                .bind(&input.label)
                .bind(input.explicit.unwrap_or(false))
                .bind(&input.iswc)
                .bind(&input.composers)
                .bind(&input.publisher)
                .bind(&input.notes)
                .fetch_optional(&mut *tx)
                .await?;
            if let Some(id) = id {
                Self::replace_artists(&mut tx, team_id, id, &input.artists).await?;
                inserted += 1;
            }
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn insert_row(conn: &mut PgConnection, team_id: DbId, input: &CreateIsrcSong) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(&insert_query(""))
            .bind(team_id)
            .bind(&input.isrc)
            .bind(&input.title)
            .bind(&input.version)
            .bind(input.duration_seconds)
            .bind(&input.genre)
            .bind(&input.language)
            .bind(input.release_date)
            .bind(&input.label)
            .bind(input.explicit.unwrap_or(false))
            .bind(&input.iswc)
            .bind(&input.composers)
            .bind(&input.publisher)
            .bind(&input.notes)
            .fetch_one(&mut *conn)
            .await
    }

    async fn replace_artists(
        conn: &mut PgConnection,
        team_id: DbId,
        id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM isrc_song_artists WHERE isrc_song_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        let artist_ids = ArtistRepo::resolve_names_in(conn, team_id, names).await?;
        for artist_id in artist_ids {
            sqlx::query(
                "INSERT INTO isrc_song_artists (isrc_song_id, artist_id)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(artist_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn find_in(conn: &mut PgConnection, team_id: DbId, id: DbId) -> Result<Option<IsrcSong>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM isrc_songs WHERE team_id = $1 AND id = $2");
        sqlx::query_as::<_, IsrcSong>(&query)
            .bind(team_id)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}

fn insert_query(on_conflict: &str) -> String {
    format!(
        "INSERT INTO isrc_songs (team_id, isrc, title, version, duration_seconds, genre, language,
                                 release_date, label, explicit, iswc, composers, publisher, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         {on_conflict}
         RETURNING id"
    )
}

fn build_filter(team_id: DbId, query: &ListQuery, filters: &IsrcSongFilters) -> Filter {
    let mut filter = Filter::for_team(team_id);
    filter
        .eq_opt("genre", filters.genre.clone().map(BindValue::Text))
        .eq_opt("label", filters.label.clone().map(BindValue::Text))
        .eq_opt("explicit", filters.explicit.map(BindValue::Bool))
        .search(SEARCH_COLUMNS, query.search_pattern());
    if let Some(artist_id) = filters.artist_id {
        filter.push(
            "EXISTS (SELECT 1 FROM isrc_song_artists sa WHERE sa.isrc_song_id = isrc_songs.id AND sa.artist_id = ?)",
            BindValue::BigInt(artist_id),
        );
    }
    filter
}
