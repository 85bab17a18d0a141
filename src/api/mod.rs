//! Aurora REST API
//!
//! HTTP API layer for Aurora, built with Axum.
//!
//! # Endpoints
//!
//! ## Search
//! - `GET /search?query=&page=&size=` - Paginated substring search
//! - `GET /messages?page=&size=` - Paginated listing of the indexed set
//!
//! ## Index
//! - `POST /reindex` - Refetch from upstream and rebuild the index
//!
//! ## Health
//! - `GET /` - Service banner
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe (index built)
//! - `GET /health` - Full health status
//!
//! Every response carries an `X-Response-Time` header.
//!
//! # Example
//!
//! ```rust,ignore
//! use aurora::api::{serve, ApiConfig, AppState};
//! use aurora::fetcher::{FetcherConfig, MessageFetcher};
//! use aurora::index::Indexer;
//! use aurora::reindex::Reindexer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Arc::new(MessageFetcher::new(FetcherConfig::default())?);
//!     let reindexer = Arc::new(Reindexer::new(fetcher, Arc::new(Indexer::new())));
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(reindexer, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/search", get(routes::search::search))
        .route("/messages", get(routes::messages::list_messages))
        .route("/reindex", post(routes::reindex::trigger_reindex))
        .nest("/health", health_routes)
        .layer(axum::middleware::from_fn(middleware::response_time))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Aurora API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Aurora API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
