//! Team and team membership models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A team as seen by one of its members.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamWithRole {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTeam {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Derived from the name when absent.
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTeam {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
}

/// A row from the `team_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMember {
    pub id: DbId,
    pub team_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A membership joined with the member's user record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMemberWithUser {
    pub id: DbId,
    pub team_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub email: String,
    pub name: String,
    pub created_at: Timestamp,
}

/// Invite an existing user by email.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddTeamMember {
    #[validate(email)]
    pub email: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTeamMember {
    pub role: String,
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "team".to_string()
    } else {
        slug
    }
}
