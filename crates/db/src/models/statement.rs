//! Distribution statement model with territory and platform children.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::aggregator::Aggregator;
use sonora_core::import::statement::StatementLine;
use sonora_core::types::{Date, DbId, Timestamp};
use validator::Validate;

/// A row from the `distribution_statements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Statement {
    pub id: DbId,
    pub team_id: DbId,
    pub aggregator: String,
    pub period: Date,
    pub track_title: Option<String>,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub artist_name: Option<String>,
    pub release_title: Option<String>,
    pub total_units: i64,
    pub total_revenue: f64,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `statement_territories` or `statement_platforms`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatementBreakdown {
    pub id: DbId,
    pub statement_id: DbId,
    pub name: String,
    pub units: i64,
    pub revenue: f64,
}

/// A statement with both breakdowns, as returned by the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatementDetail {
    #[serde(flatten)]
    pub statement: Statement,
    pub territories: Vec<StatementBreakdown>,
    pub platforms: Vec<StatementBreakdown>,
}

/// Bulk request: raw report lines from one aggregator.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkStatementLines {
    pub aggregator: Aggregator,
    #[validate(length(min = 1))]
    pub lines: Vec<StatementLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementFilters {
    pub aggregator: Option<Aggregator>,
    pub isrc: Option<String>,
    pub period_from: Option<Date>,
    pub period_to: Option<Date>,
}
