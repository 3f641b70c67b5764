//! HTTP surface of the refinement proxy.
//!
//! Routes:
//! - `POST /refine`   `{text}` -> `{refinedPrompt, usage}`
//! - `POST /estimate` `{text}` -> `{tokens, costUsd}`
//! - `POST /diff`     `{original, revised}` -> `{segments}`
//! - `GET  /health`

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::estimate::TokenEstimator;
use crate::refine::RefinementProxy;

pub use error::ApiError;
pub use handlers::{DiffRequest, DiffResponse, RefineResponse};

/// Errors starting or running the server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared state for all handlers. Nothing in it is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<RefinementProxy>,
    pub estimator: Arc<TokenEstimator>,
}

impl AppState {
    pub fn new(proxy: RefinementProxy, estimator: TokenEstimator) -> Self {
        Self {
            proxy: Arc::new(proxy),
            estimator: Arc::new(estimator),
        }
    }
}

/// Create the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/refine", post(handlers::refine))
        .route("/estimate", post(handlers::estimate))
        .route("/diff", post(handlers::diff))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    let local: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(addr = ?local, "prompt refiner listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
