//! Team roles and what each may do.
//!
//! Role names must match the CHECK constraint on `team_members.role`.

use crate::error::CoreError;

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

/// Valid role values.
pub const VALID_ROLES: &[&str] = &[ROLE_OWNER, ROLE_ADMIN, ROLE_MEMBER];

/// Validate a role name.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {VALID_ROLES:?}"
        )))
    }
}

/// Add, remove and re-role members.
pub fn can_manage_members(role: &str) -> bool {
    matches!(role, ROLE_OWNER | ROLE_ADMIN)
}

/// Delete catalog records and documents.
pub fn can_delete_records(role: &str) -> bool {
    matches!(role, ROLE_OWNER | ROLE_ADMIN)
}

/// Delete the team itself.
pub fn can_delete_team(role: &str) -> bool {
    role == ROLE_OWNER
}
