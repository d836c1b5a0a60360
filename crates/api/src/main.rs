use std::sync::Arc;
use std::time::Duration;

use sonora_cloud::{
    AiConfig, ChatCompletionsClient, HttpTextExtractor, ObjectStore, S3ObjectStore, StorageConfig,
    TextExtractionConfig,
};
use sonora_db::repositories::SessionRepo;
use sonora_db::DbPool;
use sonora_worker::{recover_pending, ContractExtractionPipeline, JobQueue};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sonora_api::config::{ExtractionMode, ServerConfig};
use sonora_api::router::build_app_router;
use sonora_api::state::AppState;

/// Period of the expired-session purge.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        addr = %config.bind_addr(),
        extraction_mode = ?config.extraction_mode,
        batch_size = config.batch.batch_size,
        "Configuration loaded"
    );

    let pool = connect_database().await;

    let storage = StorageConfig::from_env().expect("Invalid object storage configuration");
    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(&storage).await);
    tracing::info!(bucket = %storage.bucket, "Object storage ready");

    let extraction_queue = match config.extraction_mode {
        ExtractionMode::Inline => Some(start_inline_extraction(&pool, &store).await),
        ExtractionMode::External => {
            tracing::info!("Pending contracts are left for sonora-worker");
            None
        }
    };

    let cleanup = CancellationToken::new();
    let cleanup_task = spawn_session_cleanup(pool.clone(), cleanup.clone());

    let app = build_app_router(AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        extraction_queue: extraction_queue.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .expect("Failed to bind the listen address");
    tracing::info!(addr = %config.bind_addr(), "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Connections are drained; finish the contract in flight, then stop.
    if let Some(queue) = extraction_queue {
        let budget = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(budget, queue.shutdown()).await.is_err() {
            tracing::warn!(secs = config.shutdown_timeout_secs, "Extraction still running at shutdown deadline");
        }
    }
    cleanup.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), cleanup_task).await;
    tracing::info!("Shutdown complete");
}

/// `RUST_LOG` filtering; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sonora_api=debug,sonora_worker=debug,tower_http=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, check and migrate. Any failure aborts startup.
async fn connect_database() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sonora_db::create_pool(&url)
        .await
        .expect("Failed to connect to the database");
    sonora_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    sonora_db::run_migrations(&pool)
        .await
        .expect("Failed to apply migrations");
    tracing::info!("Database ready");
    pool
}

/// Build the extraction clients, start the queue and re-enqueue contracts
/// left pending by a previous run.
async fn start_inline_extraction(pool: &DbPool, store: &Arc<dyn ObjectStore>) -> Arc<JobQueue> {
    let text = TextExtractionConfig::from_env().expect("Invalid text extraction configuration");
    let ai = AiConfig::from_env().expect("Invalid AI configuration");
    let pipeline = ContractExtractionPipeline::new(
        pool.clone(),
        Arc::clone(store),
        Arc::new(HttpTextExtractor::new(&text).expect("Failed to build the text extraction client")),
        Arc::new(ChatCompletionsClient::new(&ai).expect("Failed to build the AI client")),
    );
    let queue = Arc::new(JobQueue::start(Arc::new(pipeline)));

    match recover_pending(pool, &queue).await {
        Ok(count) => tracing::info!(count, "Pending contracts re-enqueued"),
        Err(e) => tracing::error!(error = %e, "Could not re-enqueue pending contracts"),
    }
    queue
}

fn spawn_session_cleanup(pool: DbPool, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => match SessionRepo::cleanup_expired(&pool).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "Expired sessions purged"),
                    Err(e) => tracing::error!(error = %e, "Session purge failed"),
                },
            }
        }
    })
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
