//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Every catalog query is scoped
//! by `team_id`.

pub mod artist_repo;
pub mod contract_repo;
pub mod document_repo;
pub mod isrc_song_repo;
pub mod lpm_product_repo;
pub mod session_repo;
pub mod statement_repo;
pub mod stats_repo;
pub mod team_member_repo;
pub mod team_repo;
pub mod tustreams_repo;
pub mod user_repo;

pub use artist_repo::ArtistRepo;
pub use contract_repo::ContractRepo;
pub use document_repo::DocumentRepo;
pub use isrc_song_repo::IsrcSongRepo;
pub use lpm_product_repo::LpmProductRepo;
pub use session_repo::SessionRepo;
pub use statement_repo::StatementRepo;
pub use stats_repo::StatsRepo;
pub use team_member_repo::TeamMemberRepo;
pub use team_repo::TeamRepo;
pub use tustreams_repo::TustreamsRepo;
pub use user_repo::UserRepo;
