//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the user behind a JWT Bearer token.
//! - [`team::TeamAccess`] -- an authenticated member of the team named in
//!   the `{team_id}` path segment, with their role.

pub mod auth;
pub mod team;
