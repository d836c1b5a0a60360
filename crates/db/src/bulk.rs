//! Sequential chunked inserts with a per-chunk timeout.

use std::future::Future;

use sonora_core::batching::{BatchConfig, BulkSummary};

use crate::error::DbError;

/// Run `insert` once per chunk of `items`, one chunk at a time.
///
/// `insert` receives the 0-based chunk index and the chunk, and must do
/// all of its work in a single transaction, returning the number of rows
/// inserted. A chunk that exceeds `config.timeout` is dropped, which rolls
/// its transaction back, and the whole operation stops with
/// [`DbError::Timeout`].
pub async fn run_in_batches<'a, T, F, Fut>(
    config: &BatchConfig,
    items: &'a [T],
    mut insert: F,
) -> Result<BulkSummary, DbError>
where
    F: FnMut(usize, &'a [T]) -> Fut,
    Fut: Future<Output = Result<usize, sqlx::Error>>,
{
    let mut summary = BulkSummary {
        requested: items.len(),
        ..BulkSummary::default()
    };

    for (index, chunk) in items.chunks(config.batch_size).enumerate() {
        let inserted = tokio::time::timeout(config.timeout, insert(index, chunk))
            .await
            .map_err(|_| DbError::Timeout {
                batch: index + 1,
                timeout_secs: config.timeout.as_secs(),
            })??;

        summary.inserted += inserted;
        summary.batches += 1;
        tracing::debug!(
            batch = index + 1,
            rows = chunk.len(),
            inserted,
            "Bulk chunk committed"
        );
    }

    Ok(summary)
}
