//! Repository for `distribution_statements` and their breakdown tables.

use sqlx::PgPool;
use sonora_core::batching::{BatchConfig, BulkSummary};
use sonora_core::statements::StatementDraft;
use sonora_core::table::{resolve_sort, ListQuery, Paginated, MAX_EXPORT_ROWS};
use sonora_core::types::DbId;

use crate::bulk::run_in_batches;
use crate::error::DbError;
use crate::filter::{fetch_for_export, fetch_page, BindValue, Filter};
use crate::models::statement::{Statement, StatementBreakdown, StatementDetail, StatementFilters};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, aggregator, period, track_title, isrc, upc, artist_name, \
                       release_title, total_units, total_revenue, currency, created_at, updated_at";

/// Columns a list may be sorted by.
pub const SORT_COLUMNS: &[&str] = &[
    "period",
    "aggregator",
    "track_title",
    "isrc",
    "artist_name",
    "total_units",
    "total_revenue",
    "created_at",
];

const SEARCH_COLUMNS: &[&str] = &["track_title", "isrc", "upc", "artist_name", "release_title"];

/// Provides read, delete and bulk insert operations for statements.
pub struct StatementRepo;

impl StatementRepo {
    /// Find a statement with its territory and platform breakdowns.
    pub async fn find_detail(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
    ) -> Result<Option<StatementDetail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM distribution_statements WHERE team_id = $1 AND id = $2");
        let Some(statement) = sqlx::query_as::<_, Statement>(&query)
            .bind(team_id)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let territories = sqlx::query_as::<_, StatementBreakdown>(
            "SELECT id, statement_id, territory AS name, units, revenue
             FROM statement_territories
             WHERE statement_id = $1
             ORDER BY revenue DESC, territory ASC",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let platforms = sqlx::query_as::<_, StatementBreakdown>(
            "SELECT id, statement_id, platform AS name, units, revenue
             FROM statement_platforms
             WHERE statement_id = $1
             ORDER BY revenue DESC, platform ASC",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(StatementDetail {
            statement,
            territories,
            platforms,
        }))
    }

    /// One page of statements matching the query.
    pub async fn list(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &StatementFilters,
    ) -> Result<Paginated<Statement>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "period")?;
        let filter = build_filter(team_id, query, filters);
        let page = query.page();
        let (items, total) =
            fetch_page(pool, COLUMNS, "distribution_statements", &filter, sort, query.dir(), page).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Every statement matching the query (capped), for CSV export.
    pub async fn export(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &StatementFilters,
    ) -> Result<Vec<Statement>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "period")?;
        let filter = build_filter(team_id, query, filters);
        Ok(fetch_for_export(
            pool,
            COLUMNS,
            "distribution_statements",
            &filter,
            sort,
            query.dir(),
            MAX_EXPORT_ROWS,
        )
        .await?)
    }

    /// Delete a statement and its breakdowns.
    pub async fn delete(pool: &PgPool, team_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM distribution_statements WHERE team_id = $1 AND id = $2")
            .bind(team_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert aggregated drafts with their breakdowns, `config.batch_size`
    /// statements per transaction.
    pub async fn bulk_create_drafts(
        pool: &PgPool,
        team_id: DbId,
        config: &BatchConfig,
        drafts: &[StatementDraft],
    ) -> Result<BulkSummary, DbError> {
        run_in_batches(config, drafts, |_, chunk| Self::insert_chunk(pool, team_id, chunk)).await
    }

    async fn insert_chunk(pool: &PgPool, team_id: DbId, chunk: &[StatementDraft]) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for draft in chunk {
            let id: DbId = sqlx::query_scalar(
                "INSERT INTO distribution_statements
                    (team_id, aggregator, period, track_title, isrc, upc, artist_name,
                     release_title, total_units, total_revenue, currency)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 RETURNING id",
            )
            .bind(team_id)
            .bind(draft.aggregator.as_str())
            .bind(draft.period)
            .bind(&draft.track_title)
            .bind(&draft.isrc)
            .bind(&draft.upc)
            .bind(&draft.artist_name)
            .bind(&draft.release_title)
            .bind(draft.total_units)
            .bind(draft.total_revenue)
            .bind(&draft.currency)
            .fetch_one(&mut *tx)
            .await?;

            for territory in &draft.territories {
                sqlx::query(
                    "INSERT INTO statement_territories (statement_id, territory, units, revenue)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(id)
                .bind(&territory.name)
                .bind(territory.units)
                .bind(territory.revenue)
                .execute(&mut *tx)
                .await?;
            }

            for platform in &draft.platforms {
                sqlx::query(
                    "INSERT INTO statement_platforms (statement_id, platform, units, revenue)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(id)
                .bind(&platform.name)
                .bind(platform.units)
                .bind(platform.revenue)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Ok(chunk.len())
    }
}

fn build_filter(team_id: DbId, query: &ListQuery, filters: &StatementFilters) -> Filter {
    let mut filter = Filter::for_team(team_id);
    filter
        .eq_opt(
            "aggregator",
            filters.aggregator.map(|a| BindValue::Text(a.as_str().to_string())),
        )
        .eq_opt("isrc", filters.isrc.clone().map(BindValue::Text))
        .search(SEARCH_COLUMNS, query.search_pattern());
    if let Some(from) = filters.period_from {
        filter.push("period >= ?", BindValue::Date(from));
    }
    if let Some(to) = filters.period_to {
        filter.push("period <= ?", BindValue::Date(to));
    }
    filter
}
