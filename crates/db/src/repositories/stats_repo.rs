//! Dashboard aggregates for one team.

use sqlx::PgPool;
use sonora_core::types::DbId;

use crate::models::stats::{EntityCounts, LabelCount, LabelRevenue, MonthlyRevenue, TeamOverview};

/// Contracts ending within this many days count as expiring soon.
pub const EXPIRING_WINDOW_DAYS: i32 = 90;

/// How many platforms and territories the overview ranks.
pub const TOP_N: i64 = 10;

/// Months of revenue history in the overview.
pub const REVENUE_MONTHS: i32 = 12;

/// Read-only aggregate queries.
pub struct StatsRepo;

impl StatsRepo {
    /// Everything the team dashboard shows, in one call.
    pub async fn team_overview(pool: &PgPool, team_id: DbId) -> Result<TeamOverview, sqlx::Error> {
        let counts = Self::entity_counts(pool, team_id).await?;

        let documents_by_status = sqlx::query_as::<_, LabelCount>(
            "SELECT s.name AS label, COUNT(d.id) AS count
             FROM document_statuses s
             LEFT JOIN documents d ON d.status_id = s.id AND d.team_id = $1
             GROUP BY s.id, s.name
             ORDER BY s.id",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        let contracts_by_status = sqlx::query_as::<_, LabelCount>(
            "SELECT s.name AS label, COUNT(c.id) AS count
             FROM contract_statuses s
             LEFT JOIN contracts c ON c.status_id = s.id AND c.team_id = $1
             GROUP BY s.id, s.name
             ORDER BY s.id",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        let contracts_expiring_soon: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contracts
             WHERE team_id = $1 AND end_date BETWEEN CURRENT_DATE AND CURRENT_DATE + $2::int",
        )
        .bind(team_id)
        .bind(EXPIRING_WINDOW_DAYS)
        .fetch_one(pool)
        .await?;

        let revenue_by_aggregator = sqlx::query_as::<_, LabelRevenue>(
            "SELECT aggregator AS label,
                    COALESCE(SUM(total_units), 0)::BIGINT AS units,
                    COALESCE(SUM(total_revenue), 0) AS revenue
             FROM distribution_statements
             WHERE team_id = $1
             GROUP BY aggregator
             ORDER BY revenue DESC, aggregator",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        let top_platforms = sqlx::query_as::<_, LabelRevenue>(
            "SELECT p.platform AS label,
                    COALESCE(SUM(p.units), 0)::BIGINT AS units,
                    COALESCE(SUM(p.revenue), 0) AS revenue
             FROM statement_platforms p
             JOIN distribution_statements ds ON ds.id = p.statement_id
             WHERE ds.team_id = $1
             GROUP BY p.platform
             ORDER BY revenue DESC, p.platform
             LIMIT $2",
        )
        .bind(team_id)
        .bind(TOP_N)
        .fetch_all(pool)
        .await?;

        let top_territories = sqlx::query_as::<_, LabelRevenue>(
            "SELECT t.territory AS label,
                    COALESCE(SUM(t.units), 0)::BIGINT AS units,
                    COALESCE(SUM(t.revenue), 0) AS revenue
             FROM statement_territories t
             JOIN distribution_statements ds ON ds.id = t.statement_id
             WHERE ds.team_id = $1
             GROUP BY t.territory
             ORDER BY revenue DESC, t.territory
             LIMIT $2",
        )
        .bind(team_id)
        .bind(TOP_N)
        .fetch_all(pool)
        .await?;

        let monthly_revenue = sqlx::query_as::<_, MonthlyRevenue>(
            "SELECT period,
                    COALESCE(SUM(total_units), 0)::BIGINT AS units,
                    COALESCE(SUM(total_revenue), 0) AS revenue
             FROM distribution_statements
             WHERE team_id = $1
               AND period >= (date_trunc('month', CURRENT_DATE) - make_interval(months => $2 - 1))::date
             GROUP BY period
             ORDER BY period",
        )
        .bind(team_id)
        .bind(REVENUE_MONTHS)
        .fetch_all(pool)
        .await?;

        Ok(TeamOverview {
            counts,
            documents_by_status,
            contracts_by_status,
            contracts_expiring_soon,
            revenue_by_aggregator,
            top_platforms,
            top_territories,
            monthly_revenue,
        })
    }

    async fn entity_counts(pool: &PgPool, team_id: DbId) -> Result<EntityCounts, sqlx::Error> {
        sqlx::query_as::<_, EntityCounts>(
            "SELECT
                (SELECT COUNT(*) FROM artists WHERE team_id = $1) AS artists,
                (SELECT COUNT(*) FROM lpm_products WHERE team_id = $1) AS lpm_products,
                (SELECT COUNT(*) FROM isrc_songs WHERE team_id = $1) AS isrc_songs,
                (SELECT COUNT(*) FROM distribution_statements WHERE team_id = $1) AS statements,
                (SELECT COUNT(*) FROM tustreams_records WHERE team_id = $1) AS tustreams_records,
                (SELECT COUNT(*) FROM documents WHERE team_id = $1) AS documents,
                (SELECT COUNT(*) FROM contracts WHERE team_id = $1) AS contracts",
        )
        .bind(team_id)
        .fetch_one(pool)
        .await
    }
}
