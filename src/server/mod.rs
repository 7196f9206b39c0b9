pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::fetcher::SampleFetcher;
use handlers::{fetch_batch_handler, fetch_handler, health_handler};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<SampleFetcher>,
}

impl AppState {
    pub fn new(fetcher: Arc<SampleFetcher>) -> Self {
        Self { fetcher }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest(
            "/github",
            Router::new()
                .route("/fetch", post(fetch_handler))
                .route("/fetch-batch", post(fetch_batch_handler)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(listen_addr = %listener.local_addr()?, "starting sample server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
