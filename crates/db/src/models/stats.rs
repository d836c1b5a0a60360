//! Aggregate figures for the team dashboard.

use serde::Serialize;
use sqlx::FromRow;
use sonora_core::types::Date;

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct EntityCounts {
    pub artists: i64,
    pub lpm_products: i64,
    pub isrc_songs: i64,
    pub statements: i64,
    pub tustreams_records: i64,
    pub documents: i64,
    pub contracts: i64,
}

/// A `(label, count)` pair such as documents per status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// A `(label, units, revenue)` triple such as revenue per platform.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LabelRevenue {
    pub label: String,
    pub units: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthlyRevenue {
    pub period: Date,
    pub units: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamOverview {
    pub counts: EntityCounts,
    pub documents_by_status: Vec<LabelCount>,
    pub contracts_by_status: Vec<LabelCount>,
    pub contracts_expiring_soon: i64,
    pub revenue_by_aggregator: Vec<LabelRevenue>,
    pub top_platforms: Vec<LabelRevenue>,
    pub top_territories: Vec<LabelRevenue>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}
