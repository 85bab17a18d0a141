//! Aurora API Server
//!
//! Run with: cargo run --bin aurora
//!
//! Configuration is read from `--config`, else the default locations
//! (see [`aurora::Config::default_paths`]), then environment overrides:
//! - `AURORA_UPSTREAM_URL`: Upstream origin
//! - `AURORA_API_HOST` / `AURORA_API_PORT`: Bind address (default: 0.0.0.0:8000)
//! - `AURORA_REINDEX_INTERVAL_SECS`: Periodic reindex (default: 0, disabled)
//! - `AURORA_LOG_LEVEL` / `AURORA_LOG_FORMAT`: Logging (default: info, pretty)
//! - `RUST_LOG`: Full filter directive, wins over the log level

use aurora::api::{serve, AppState};
use aurora::fetcher::{MessageFetcher, MessageSource};
use aurora::index::Indexer;
use aurora::reindex::Reindexer;
use aurora::{Config, LoggingConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "aurora")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory message search engine")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Skip the startup reindex
    #[arg(long)]
    no_initial_index: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging is configured by the file, so load errors go to the caller
    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging);

    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    tracing::info!("Starting Aurora Search Engine v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Upstream: {}", config.fetcher.base_url);

    let fetcher: Arc<dyn MessageSource> = Arc::new(MessageFetcher::new(config.fetcher.clone())?);
    let indexer = Arc::new(Indexer::new());
    let reindexer = Arc::new(Reindexer::new(fetcher, indexer));

    if args.no_initial_index {
        tracing::info!("Startup reindex skipped; index is not ready until POST /reindex");
    } else {
        match reindexer.reindex().await {
            Ok(status) => tracing::info!("Indexed {} messages on startup", status.count),
            Err(e) => tracing::warn!("Failed to index messages on startup: {}", e),
        }
    }

    let background =
        Arc::clone(&reindexer).start_background_reindex(config.index.reindex_interval());

    let state = AppState::new(reindexer, config.api.clone());
    serve(state, &config.api).await?;

    if let Some(handle) = background {
        handle.abort();
    }

    tracing::info!("Aurora stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
