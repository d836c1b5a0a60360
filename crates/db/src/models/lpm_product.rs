//! LPM product entity model and DTOs.
//!
//! One row per track; product-level fields repeat across the tracks of a
//! release.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::types::{Date, DbId, Timestamp};
use validator::Validate;

/// A row from the `lpm_products` table with its linked artist names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LpmProduct {
    pub id: DbId,
    pub team_id: DbId,
    pub upc: String,
    pub catalog_number: Option<String>,
    pub release_title: Option<String>,
    pub release_version: Option<String>,
    pub release_artist: Option<String>,
    pub label_name: Option<String>,
    pub release_type: Option<String>,
    pub release_format: Option<String>,
    pub genre: Option<String>,
    pub subgenre: Option<String>,
    pub release_date: Option<Date>,
    pub original_release_date: Option<Date>,
    pub pre_order_date: Option<Date>,
    pub p_line_year: Option<i32>,
    pub p_line_text: Option<String>,
    pub c_line_year: Option<i32>,
    pub c_line_text: Option<String>,
    pub territories: Option<String>,
    pub excluded_territories: Option<String>,
    pub price_tier: Option<String>,
    pub explicit_content: Option<bool>,
    pub language: Option<String>,
    pub total_volumes: Option<i32>,
    pub total_tracks: Option<i32>,
    pub artwork_file: Option<String>,
    pub dsp_exclusions: Option<String>,
    pub aggregator: Option<String>,
    pub delivery_status: Option<String>,
    pub notes: Option<String>,
    pub isrc: Option<String>,
    pub track_title: Option<String>,
    pub track_version: Option<String>,
    pub track_artist: Option<String>,
    pub featured_artists: Option<String>,
    pub track_number: Option<i32>,
    pub volume_number: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub track_genre: Option<String>,
    pub track_language: Option<String>,
    pub track_explicit: Option<bool>,
    pub preview_start_seconds: Option<i32>,
    pub composers: Option<String>,
    pub lyricists: Option<String>,
    pub arrangers: Option<String>,
    pub producers: Option<String>,
    pub publishers: Option<String>,
    pub iswc: Option<String>,
    pub track_p_line_year: Option<i32>,
    pub track_p_line_text: Option<String>,
    pub audio_file: Option<String>,
    pub recording_year: Option<i32>,
    pub recording_country: Option<String>,
    pub available_separately: Option<bool>,
    pub primary_artist_spotify_id: Option<String>,
    pub primary_artist_apple_id: Option<String>,
    /// Names of linked artists, alphabetical.
    pub artists: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO. Also the target of a mapped CSV row.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateLpmProduct {
    #[validate(length(min = 12, max = 14))]
    pub upc: String,
    pub catalog_number: Option<String>,
    pub release_title: Option<String>,
    pub release_version: Option<String>,
    pub release_artist: Option<String>,
    pub label_name: Option<String>,
    pub release_type: Option<String>,
    pub release_format: Option<String>,
    pub genre: Option<String>,
    pub subgenre: Option<String>,
    pub release_date: Option<Date>,
    pub original_release_date: Option<Date>,
    pub pre_order_date: Option<Date>,
    pub p_line_year: Option<i32>,
    pub p_line_text: Option<String>,
    pub c_line_year: Option<i32>,
    pub c_line_text: Option<String>,
    pub territories: Option<String>,
    pub excluded_territories: Option<String>,
    pub price_tier: Option<String>,
    pub explicit_content: Option<bool>,
    pub language: Option<String>,
    pub total_volumes: Option<i32>,
    pub total_tracks: Option<i32>,
    pub artwork_file: Option<String>,
    pub dsp_exclusions: Option<String>,
    pub aggregator: Option<String>,
    pub delivery_status: Option<String>,
    pub notes: Option<String>,
    pub isrc: Option<String>,
    pub track_title: Option<String>,
    pub track_version: Option<String>,
    pub track_artist: Option<String>,
    pub featured_artists: Option<String>,
    pub track_number: Option<i32>,
    pub volume_number: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub track_genre: Option<String>,
    pub track_language: Option<String>,
    pub track_explicit: Option<bool>,
    pub preview_start_seconds: Option<i32>,
    pub composers: Option<String>,
    pub lyricists: Option<String>,
    pub arrangers: Option<String>,
    pub producers: Option<String>,
    pub publishers: Option<String>,
    pub iswc: Option<String>,
    pub track_p_line_year: Option<i32>,
    pub track_p_line_text: Option<String>,
    pub audio_file: Option<String>,
    pub recording_year: Option<i32>,
    pub recording_country: Option<String>,
    pub available_separately: Option<bool>,
    pub primary_artist_spotify_id: Option<String>,
    pub primary_artist_apple_id: Option<String>,
    /// Artist names to link; created in the team when missing.
    #[serde(default)]
    pub artists: Vec<String>,
}

/// Patch DTO. `artists`, when present, replaces every artist link.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLpmProduct {
    pub upc: Option<String>,
    pub catalog_number: Option<String>,
    pub release_title: Option<String>,
    pub release_version: Option<String>,
    pub release_artist: Option<String>,
    pub label_name: Option<String>,
    pub release_type: Option<String>,
    pub release_format: Option<String>,
    pub genre: Option<String>,
    pub subgenre: Option<String>,
    pub release_date: Option<Date>,
    pub original_release_date: Option<Date>,
    pub pre_order_date: Option<Date>,
    pub p_line_year: Option<i32>,
    pub p_line_text: Option<String>,
    pub c_line_year: Option<i32>,
    pub c_line_text: Option<String>,
    pub territories: Option<String>,
    pub excluded_territories: Option<String>,
    pub price_tier: Option<String>,
    pub explicit_content: Option<bool>,
    pub language: Option<String>,
    pub total_volumes: Option<i32>,
    pub total_tracks: Option<i32>,
    pub artwork_file: Option<String>,
    pub dsp_exclusions: Option<String>,
    pub aggregator: Option<String>,
    pub delivery_status: Option<String>,
    pub notes: Option<String>,
    pub isrc: Option<String>,
    pub track_title: Option<String>,
    pub track_version: Option<String>,
    pub track_artist: Option<String>,
    pub featured_artists: Option<String>,
    pub track_number: Option<i32>,
    pub volume_number: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub track_genre: Option<String>,
    pub track_language: Option<String>,
    pub track_explicit: Option<bool>,
    pub preview_start_seconds: Option<i32>,
    pub composers: Option<String>,
    pub lyricists: Option<String>,
    pub arrangers: Option<String>,
    pub producers: Option<String>,
    pub publishers: Option<String>,
    pub iswc: Option<String>,
    pub track_p_line_year: Option<i32>,
    pub track_p_line_text: Option<String>,
    pub audio_file: Option<String>,
    pub recording_year: Option<i32>,
    pub recording_country: Option<String>,
    pub available_separately: Option<bool>,
    pub primary_artist_spotify_id: Option<String>,
    pub primary_artist_apple_id: Option<String>,
    pub artists: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LpmFilters {
    pub release_type: Option<String>,
    pub genre: Option<String>,
    pub aggregator: Option<String>,
    pub upc: Option<String>,
    pub release_from: Option<Date>,
    pub release_to: Option<Date>,
}
