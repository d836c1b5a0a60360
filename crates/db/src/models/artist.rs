//! Artist entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `artists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Artist {
    pub id: DbId,
    pub team_id: DbId,
    pub name: String,
    pub spotify_id: Option<String>,
    pub apple_music_id: Option<String>,
    pub country: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateArtist {
    #[validate(length(min = 1, max = 300))]
    pub name: String,
    pub spotify_id: Option<String>,
    pub apple_music_id: Option<String>,
    #[validate(length(equal = 2))]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateArtist {
    #[validate(length(min = 1, max = 300))]
    pub name: Option<String>,
    pub spotify_id: Option<String>,
    pub apple_music_id: Option<String>,
    #[validate(length(equal = 2))]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistFilters {
    pub country: Option<String>,
}
