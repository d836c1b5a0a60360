//! Repository for the `tustreams_records` table.

use sqlx::{PgConnection, PgPool};
use sonora_core::batching::{BatchConfig, BulkSummary};
use sonora_core::import::statement::{DEFAULT_CURRENCY, DEFAULT_TERRITORY};
use sonora_core::table::{resolve_sort, ListQuery, Paginated, MAX_EXPORT_ROWS};
use sonora_core::types::DbId;

use crate::bulk::run_in_batches;
use crate::error::DbError;
use crate::filter::{fetch_for_export, fetch_page, BindValue, Filter};
use crate::models::tustreams::{
    CreateTustreamsRecord, TustreamsFilters, TustreamsRecord, UpdateTustreamsRecord,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, period, platform, country, isrc, upc, track_title, artist_name, \
                       release_title, streams, downloads, revenue, currency, created_at, updated_at";

/// Columns a list may be sorted by.
pub const SORT_COLUMNS: &[&str] = &[
    "period",
    "platform",
    "country",
    "isrc",
    "track_title",
    "artist_name",
    "streams",
    "downloads",
    "revenue",
    "created_at",
];

const SEARCH_COLUMNS: &[&str] = &["track_title", "artist_name", "isrc", "upc", "release_title"];

/// Provides CRUD and bulk operations for TuStreams records.
pub struct TustreamsRepo;

impl TustreamsRepo {
    /// Insert a record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        team_id: DbId,
        input: &CreateTustreamsRecord,
    ) -> Result<TustreamsRecord, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert_row(&mut conn, team_id, input).await
    }

    /// Find a record by ID within a team.
    pub async fn find_by_id(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
    ) -> Result<Option<TustreamsRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tustreams_records WHERE team_id = $1 AND id = $2");
        sqlx::query_as::<_, TustreamsRecord>(&query)
            .bind(team_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of records matching the query.
    pub async fn list(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &TustreamsFilters,
    ) -> Result<Paginated<TustreamsRecord>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "period")?;
        let filter = build_filter(team_id, query, filters);
        let page = query.page();
        let (items, total) =
            fetch_page(pool, COLUMNS, "tustreams_records", &filter, sort, query.dir(), page).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Every record matching the query (capped), for CSV export.
    pub async fn export(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &TustreamsFilters,
    ) -> Result<Vec<TustreamsRecord>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "period")?;
        let filter = build_filter(team_id, query, filters);
        Ok(fetch_for_export(
            pool,
            COLUMNS,
            "tustreams_records",
            &filter,
            sort,
            query.dir(),
            MAX_EXPORT_ROWS,
        )
        .await?)
    }

    /// Update a record. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
        input: &UpdateTustreamsRecord,
    ) -> Result<Option<TustreamsRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE tustreams_records SET
                period = COALESCE($3, period),
                platform = COALESCE($4, platform),
                country = COALESCE($5, country),
                isrc = COALESCE($6, isrc),
                upc = COALESCE($7, upc),
                track_title = COALESCE($8, track_title),
                artist_name = COALESCE($9, artist_name),
                release_title = COALESCE($10, release_title),
                streams = COALESCE($11, streams),
                downloads = COALESCE($12, downloads),
                revenue = COALESCE($13, revenue),
                currency = COALESCE($14, currency)
             WHERE team_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TustreamsRecord>(&query)
            .bind(team_id)
            .bind(id)
            .bind(input.period.map(sonora_core::dates::period_start))
            .bind(&input.platform)
            .bind(input.country.as_deref().map(str::to_uppercase))
            .bind(&input.isrc)
            .bind(&input.upc)
            .bind(&input.track_title)
            .bind(&input.artist_name)
            .bind(&input.release_title)
            .bind(input.streams)
            .bind(input.downloads)
            .bind(input.revenue)
            .bind(input.currency.as_deref().map(str::to_uppercase))
            .fetch_optional(pool)
            .await
    }

    /// Delete a record. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, team_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tustreams_records WHERE team_id = $1 AND id = $2")
            .bind(team_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert many records, `config.batch_size` per transaction.
    pub async fn bulk_create(
        pool: &PgPool,
        team_id: DbId,
        config: &BatchConfig,
        inputs: &[CreateTustreamsRecord],
    ) -> Result<BulkSummary, DbError> {
        run_in_batches(config, inputs, |_, chunk| Self::insert_chunk(pool, team_id, chunk)).await
    }

    async fn insert_chunk(
        pool: &PgPool,
        team_id: DbId,
        chunk: &[CreateTustreamsRecord],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for input in chunk {
            Self::insert_row(&mut tx, team_id, input).await?;
        }
        tx.commit().await?;
        Ok(chunk.len())
    }

    async fn insert_row(
        conn: &mut PgConnection,
        team_id: DbId,
        input: &CreateTustreamsRecord,
    ) -> Result<TustreamsRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO tustreams_records
                (team_id, period, platform, country, isrc, upc, track_title, artist_name,
                 release_title, streams, downloads, revenue, currency)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TustreamsRecord>(&query)
            .bind(team_id)
            .bind(sonora_core::dates::period_start(input.period))
            .bind(&input.platform)
            .bind(
                input
                    .country
                    .as_deref()
                    .map(str::to_uppercase)
                    .unwrap_or_else(|| DEFAULT_TERRITORY.to_string()),
            )
            .bind(&input.isrc)
            .bind(&input.upc)
            .bind(&input.track_title)
            .bind(&input.artist_name)
            .bind(&input.release_title)
            .bind(input.streams.unwrap_or(0))
            .bind(input.downloads.unwrap_or(0))
            .bind(input.revenue.unwrap_or(0.0))
            .bind(
                input
                    .currency
                    .as_deref()
                    .map(str::to_uppercase)
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            )
            .fetch_one(&mut *conn)
            .await
    }
}

fn build_filter(team_id: DbId, query: &ListQuery, filters: &TustreamsFilters) -> Filter {
    let mut filter = Filter::for_team(team_id);
    filter
        .eq_opt("platform", filters.platform.clone().map(BindValue::Text))
        .eq_opt(
            "country",
            filters.country.as_ref().map(|c| BindValue::Text(c.to_uppercase())),
        )
        .search(SEARCH_COLUMNS, query.search_pattern());
    if let Some(from) = filters.period_from {
        filter.push("period >= ?", BindValue::Date(from));
    }
    if let Some(to) = filters.period_to {
        filter.push("period <= ?", BindValue::Date(to));
    }
    filter
}
