//! Credentials and tokens.
//!
//! [`credentials`] hashes passwords and holds the lockout policy;
//! [`tokens`] signs access JWTs and mints refresh tokens.

pub mod credentials;
pub mod tokens;
