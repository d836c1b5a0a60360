//! Pure domain logic for the Sonora catalog service.
//!
//! Nothing in this crate touches the database, the network or the
//! filesystem. Repositories, HTTP handlers and the extraction worker
//! build on these types and functions.

pub mod aggregator;
pub mod batching;
pub mod contract;
pub mod dates;
pub mod error;
pub mod identifiers;
pub mod import;
pub mod roles;
pub mod statements;
pub mod status;
pub mod storage;
pub mod table;
pub mod types;
