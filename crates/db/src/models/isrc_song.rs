//! ISRC song entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::types::{Date, DbId, Timestamp};
use validator::Validate;

/// A row from the `isrc_songs` table with its linked artist names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IsrcSong {
    pub id: DbId,
    pub team_id: DbId,
    pub isrc: String,
    pub title: String,
    pub version: Option<String>,
    pub duration_seconds: Option<i32>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub release_date: Option<Date>,
    pub label: Option<String>,
    pub explicit: bool,
    pub iswc: Option<String>,
    pub composers: Option<String>,
    pub publisher: Option<String>,
    pub notes: Option<String>,
    pub artists: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateIsrcSong {
    #[validate(length(min = 12, max = 15))]
    pub isrc: String,
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub version: Option<String>,
    #[validate(range(min = 0, max = 86_400))]
    pub duration_seconds: Option<i32>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub release_date: Option<Date>,
    pub label: Option<String>,
    pub explicit: Option<bool>,
    pub iswc: Option<String>,
    pub composers: Option<String>,
    pub publisher: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
}

/// Patch DTO. `artists`, when present, replaces every artist link.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIsrcSong {
    pub isrc: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    pub version: Option<String>,
    #[validate(range(min = 0, max = 86_400))]
    pub duration_seconds: Option<i32>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub release_date: Option<Date>,
    pub label: Option<String>,
    pub explicit: Option<bool>,
    pub iswc: Option<String>,
    pub composers: Option<String>,
    pub publisher: Option<String>,
    pub notes: Option<String>,
    pub artists: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IsrcSongFilters {
    pub genre: Option<String>,
    pub label: Option<String>,
    pub explicit: Option<bool>,
    pub artist_id: Option<DbId>,
}
