//! In-process extraction queue.
//!
//! Jobs are document IDs sent over an unbounded `mpsc` channel and drained
//! by exactly one task, so they run one at a time in submission order.
//! A running job is never interrupted: [`JobQueue::shutdown`] stops the
//! consumer between jobs. Jobs still queued at shutdown stay `pending` in
//! the database and are picked up by [`recover_pending`] on the next start.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use sonora_core::types::DbId;
use sonora_db::repositories::DocumentRepo;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Work performed for each queued document.
#[async_trait]
pub trait JobProcessor: Send + Sync + 'static {
    async fn process(&self, document_id: DbId);
}

/// FIFO queue with a single consumer.
pub struct JobQueue {
    sender: mpsc::UnboundedSender<DbId>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
    /// Jobs sent but not yet picked up.
    backlog: Arc<AtomicUsize>,
}

impl JobQueue {
    /// Spawn the consumer task and return the queue handle.
    pub fn start<P: JobProcessor>(processor: Arc<P>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let backlog = Arc::new(AtomicUsize::new(0));
        let handle = tokio::spawn(consume(processor, receiver, cancel.clone(), backlog.clone()));
        tracing::info!("Extraction queue started");
        Self {
            sender,
            cancel,
            handle: Mutex::new(Some(handle)),
            backlog,
        }
    }

    /// Append a document to the queue. Returns `false` once the queue has
    /// shut down.
    pub fn enqueue(&self, document_id: DbId) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.backlog.fetch_add(1, Ordering::Relaxed);
        match self.sender.send(document_id) {
            Ok(()) => {
                tracing::debug!(document_id, "Extraction job queued");
                true
            }
            Err(_) => {
                self.backlog.fetch_sub(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Jobs waiting behind the one in flight.
    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::Relaxed)
    }

    /// Stop taking jobs and wait for the one in flight to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Extraction queue task failed");
            }
        }
        tracing::info!("Extraction queue stopped");
    }
}

async fn consume<P: JobProcessor>(
    processor: Arc<P>,
    mut receiver: mpsc::UnboundedReceiver<DbId>,
    cancel: CancellationToken,
    backlog: Arc<AtomicUsize>,
) {
    loop {
        let document_id = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = receiver.recv() => match next {
                Some(id) => id,
                None => break,
            },
        };
        backlog.fetch_sub(1, Ordering::Relaxed);
        processor.process(document_id).await;
    }
}

/// Requeue work interrupted by a restart.
///
/// Documents left in `processing` by a crash go back to `pending`, then
/// every pending contract is enqueued oldest first. Returns how many
/// were enqueued.
pub async fn recover_pending(pool: &PgPool, queue: &JobQueue) -> Result<usize, sqlx::Error> {
    let reset = DocumentRepo::reset_processing(pool).await?;
    if reset > 0 {
        tracing::warn!(reset, "Reset interrupted extractions to pending");
    }

    let ids = DocumentRepo::list_pending_ids(pool).await?;
    let mut enqueued = 0;
    for id in ids {
        if queue.enqueue(id) {
            enqueued += 1;
        }
    }
    tracing::info!(enqueued, "Pending extractions requeued");
    Ok(enqueued)
}
