//! TuStreams record model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::types::{Date, DbId, Timestamp};
use validator::Validate;

/// A row from the `tustreams_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TustreamsRecord {
    pub id: DbId,
    pub team_id: DbId,
    pub period: Date,
    pub platform: String,
    pub country: String,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub track_title: Option<String>,
    pub artist_name: Option<String>,
    pub release_title: Option<String>,
    pub streams: i64,
    pub downloads: i64,
    pub revenue: f64,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTustreamsRecord {
    pub period: Date,
    #[validate(length(min = 1, max = 200))]
    pub platform: String,
    pub country: Option<String>,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub track_title: Option<String>,
    pub artist_name: Option<String>,
    pub release_title: Option<String>,
    #[validate(range(min = 0))]
    pub streams: Option<i64>,
    #[validate(range(min = 0))]
    pub downloads: Option<i64>,
    pub revenue: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTustreamsRecord {
    pub period: Option<Date>,
    #[validate(length(min = 1, max = 200))]
    pub platform: Option<String>,
    pub country: Option<String>,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub track_title: Option<String>,
    pub artist_name: Option<String>,
    pub release_title: Option<String>,
    #[validate(range(min = 0))]
    pub streams: Option<i64>,
    #[validate(range(min = 0))]
    pub downloads: Option<i64>,
    pub revenue: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TustreamsFilters {
    pub platform: Option<String>,
    pub country: Option<String>,
    pub period_from: Option<Date>,
    pub period_to: Option<Date>,
}
