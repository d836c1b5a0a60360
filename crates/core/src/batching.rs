//! Chunking parameters for bulk-create operations.
//!
//! Bulk creates split their records into chunks of `batch_size`; each
//! chunk is inserted in its own transaction under `timeout`, and chunks
//! run one after another.

use std::time::Duration;

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Records per transaction when nothing is configured.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Upper bound for a configured batch size.
pub const MAX_BATCH_SIZE: usize = 5_000;

/// Per-chunk transaction timeout when nothing is configured.
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest number of records a single bulk request may carry.
pub const MAX_BULK_RECORDS: usize = 50_000;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Bulk-insert chunking configuration.
///
/// | Env var                   | Default |
/// |---------------------------|---------|
/// | `BULK_BATCH_SIZE`         | `500`   |
/// | `BULK_BATCH_TIMEOUT_SECS` | `30`    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_BATCH_TIMEOUT,
        }
    }
}

impl BatchConfig {
    /// Build a validated config.
    pub fn new(batch_size: usize, timeout: Duration) -> Result<Self, CoreError> {
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(CoreError::Validation(format!(
                "Batch size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
            )));
        }
        if timeout.is_zero() {
            return Err(CoreError::Validation("Batch timeout must be positive".into()));
        }
        Ok(Self { batch_size, timeout })
    }

    /// Load from environment variables, falling back to defaults for
    /// absent or unparseable values.
    ///
    /// # Panics
    ///
    /// Panics if the resulting configuration is out of range.
    pub fn from_env() -> Self {
        let batch_size = std::env::var("BULK_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let timeout_secs: u64 = std::env::var("BULK_BATCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BATCH_TIMEOUT.as_secs());

        Self::new(batch_size, Duration::from_secs(timeout_secs))
            .expect("BULK_BATCH_SIZE / BULK_BATCH_TIMEOUT_SECS out of range")
    }

    /// Number of chunks needed for `records` records.
    pub fn batch_count(&self, records: usize) -> usize {
        records.div_ceil(self.batch_size)
    }
}

/// Reject bulk payloads that are empty or too large.
pub fn validate_bulk_size(records: usize) -> Result<(), CoreError> {
    if records == 0 {
        return Err(CoreError::Validation("At least one record is required".into()));
    }
    if records > MAX_BULK_RECORDS {
        return Err(CoreError::Validation(format!(
            "Too many records: {records} (maximum {MAX_BULK_RECORDS})"
        )));
    }
    Ok(())
}

/// Outcome of a bulk create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub requested: usize,
    pub inserted: usize,
    pub batches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_out_of_range_batch_size() {
        assert_matches!(BatchConfig::new(0, DEFAULT_BATCH_TIMEOUT), Err(CoreError::Validation(_)));
        assert_matches!(
            BatchConfig::new(MAX_BATCH_SIZE + 1, DEFAULT_BATCH_TIMEOUT),
            Err(CoreError::Validation(_))
        );
        assert_matches!(BatchConfig::new(10, Duration::ZERO), Err(CoreError::Validation(_)));
    }

    #[test]
    fn batch_count_rounds_up() {
        let config = BatchConfig::new(500, DEFAULT_BATCH_TIMEOUT).unwrap();
        assert_eq!(config.batch_count(0), 0);
        assert_eq!(config.batch_count(500), 1);
        assert_eq!(config.batch_count(501), 2);
    }

    #[test]
    fn bulk_size_limits() {
        assert_matches!(validate_bulk_size(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_bulk_size(MAX_BULK_RECORDS), Ok(()));
        assert_matches!(validate_bulk_size(MAX_BULK_RECORDS + 1), Err(CoreError::Validation(_)));
    }
}
