//! logscope-analyzer - log diagnosis service
//!
//! Ingests Excel and CSV uploads, enriches each row through the log lookup, source
//! lookup and AI suggestion services, and serves the results over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use logscope_common::config::{RootFolderInitializer, RootFolderResolver};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logscope_analyzer::config::AnalyzerConfig;
use logscope_analyzer::db::files;
use logscope_analyzer::services::{HttpEnrichmentClient, WorkerPool, INTERRUPTED_RUN_MESSAGE};
use logscope_analyzer::AppState;

/// Command-line arguments for logscope-analyzer
#[derive(Parser, Debug)]
#[command(name = "logscope-analyzer")]
#[command(about = "Spreadsheet-driven log diagnosis service")]
#[command(version)]
struct Args {
    /// Bootstrap TOML configuration file
    #[arg(short, long, env = "LOGSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding the database and uploads
    #[arg(short, long, env = "LOGSCOPE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to listen on, overrides `bind_address`
    #[arg(short, long, env = "LOGSCOPE_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AnalyzerConfig::load(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting logscope-analyzer v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder)
        .with_toml_value(config.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;
    info!("Root folder: {}", initializer.root().display());

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = logscope_analyzer::db::init_database_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;

    let interrupted = files::fail_interrupted_analyses(&db_pool, INTERRUPTED_RUN_MESSAGE)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to recover interrupted analyses: {}", e))?;
    if interrupted > 0 {
        warn!("Marked {} interrupted analysis run(s) as FAILED", interrupted);
    }

    let enrichment = HttpEnrichmentClient::new(&config).context("Failed to build HTTP client")?;
    let workers = WorkerPool::new(config.analysis.worker_pool_size);
    info!("Worker pool size: {}", workers.capacity());

    let state = AppState::new(
        db_pool,
        Arc::new(enrichment),
        workers,
        initializer.uploads_dir(),
        initializer.exports_dir(),
    );
    let app = logscope_analyzer::build_router(state, config.max_upload_bytes);

    let bind_address = args.bind.unwrap_or_else(|| config.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
