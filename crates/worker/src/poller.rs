//! Polling loop for the standalone worker.
//!
//! Claims the oldest pending contract with `FOR UPDATE SKIP LOCKED`, runs
//! the pipeline, and repeats. Sleeps for `interval` when there is nothing
//! to do.

use std::time::Duration;

use sqlx::PgPool;
use sonora_db::repositories::DocumentRepo;
use tokio_util::sync::CancellationToken;

use crate::pipeline::ContractExtractionPipeline;

/// Default pause between empty polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Run until `cancel` fires. A job already running finishes first.
pub async fn run(pool: PgPool, pipeline: ContractExtractionPipeline, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Extraction poller started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match DocumentRepo::claim_next_pending(&pool).await {
            Ok(Some(document)) => {
                // Outcome is recorded on the document row.
                let _ = pipeline.run_claimed(&document).await;
                continue;
            }
            Ok(None) => tracing::trace!("No pending contracts"),
            Err(e) => tracing::error!(error = %e, "Failed to claim pending contract"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!("Extraction poller stopped");
}
