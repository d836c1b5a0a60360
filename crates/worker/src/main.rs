use std::sync::Arc;
use std::time::Duration;

use sonora_cloud::{
    AiConfig, ChatCompletionsClient, HttpTextExtractor, S3ObjectStore, StorageConfig, TextExtractionConfig,
};
use sonora_worker::poller::{self, DEFAULT_POLL_INTERVAL};
use sonora_worker::ContractExtractionPipeline;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonora_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let interval = std::env::var("WORKER_POLL_INTERVAL_SECS")
        .ok()
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_secs)
                .expect("WORKER_POLL_INTERVAL_SECS must be a number")
        })
        .unwrap_or(DEFAULT_POLL_INTERVAL);

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sonora_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    sonora_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection pool created");

    // --- External services ---
    let storage_config = StorageConfig::from_env().expect("Invalid object storage configuration");
    let store = S3ObjectStore::new(&storage_config).await;
    let extractor = HttpTextExtractor::new(&TextExtractionConfig::from_env().expect("Invalid text extraction configuration"))
        .expect("Failed to build text extraction client");
    let generator = ChatCompletionsClient::new(&AiConfig::from_env().expect("Invalid AI configuration"))
        .expect("Failed to build AI client");

    let pipeline = ContractExtractionPipeline::new(
        pool.clone(),
        Arc::new(store),
        Arc::new(extractor),
        Arc::new(generator),
    );

    let cancel = CancellationToken::new();
    let poll_handle = tokio::spawn(poller::run(pool, pipeline, interval, cancel.clone()));

    shutdown_signal().await;
    cancel.cancel();
    if let Err(e) = poll_handle.await {
        tracing::error!(error = %e, "Poller task failed");
    }
    tracing::info!("Worker shut down");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
