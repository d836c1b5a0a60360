//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - Optional list filters accepted alongside the common table query

pub mod artist;
pub mod contract;
pub mod document;
pub mod isrc_song;
pub mod lpm_product;
pub mod session;
pub mod statement;
pub mod stats;
pub mod team;
pub mod tustreams;
pub mod user;
