#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use deveui::{HttpRegistrar, RegistrationEngine};
use server::api::{AppState, router};
use server::config::{AppConfig, CliArgs};
use server::jobs::{BatchJobStore, JobQueue};
use server::oneshot::run_once;
use server::telemetry::init_telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    // Keep the guard alive so the file writer flushes on exit.
    let _telemetry = init_telemetry(config.verbose, config.log_file.as_deref())?;

    let registrar = HttpRegistrar::new()?;

    if config.daemon {
        run_daemon(config, registrar).await
    } else {
        run_once(&config, registrar).await
    }
}

async fn run_daemon(config: AppConfig, registrar: HttpRegistrar) -> anyhow::Result<()> {
    let engine = RegistrationEngine::new(config.engine.clone(), registrar)?;
    let store = Arc::new(BatchJobStore::default());
    let queue = Arc::new(JobQueue::spawn(
        engine,
        Arc::clone(&store),
        config.queue_capacity,
    ));

    let app = router(AppState::new(
        Arc::clone(&store),
        Arc::clone(&queue),
        config.max_batch_size,
    ));

    let listener = TcpListener::bind(&config.listen_addr).await?;
    log_startup_info(&config.listen_addr, &config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The listener is closed; let the running batch settle before exiting.
    queue.shutdown().await;

    #[cfg(feature = "tracing")]
    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(_addr: &str, _config: &AppConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting DevEUI batch API on {} with full config: {:#?}",
            _addr,
            _config
        );
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting DevEUI batch API on {} registering against {} with {} workers",
            _addr,
            _config.engine.endpoint,
            _config.engine.num_workers
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Shutdown signal received, terminating gracefully...");
}
