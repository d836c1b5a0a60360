use sonora_core::error::CoreError;

/// Errors from list queries and multi-statement database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// Invalid input detected before any SQL ran (e.g. an unknown sort column).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bulk chunk did not finish in time. `batch` is 1-based; chunks
    /// before it are committed.
    #[error("Batch {batch} timed out after {timeout_secs}s")]
    Timeout { batch: usize, timeout_secs: u64 },
}
