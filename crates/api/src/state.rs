use std::sync::Arc;

use sonora_cloud::ObjectStore;
use sonora_worker::JobQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sonora_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Object storage for uploaded documents.
    pub store: Arc<dyn ObjectStore>,
    /// In-process extraction queue. `None` when a standalone worker polls
    /// for pending documents instead.
    pub extraction_queue: Option<Arc<JobQueue>>,
}
