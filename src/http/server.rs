//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handler on every path
//! - Wire up middleware (request ID, tracing, CORS, body limit)
//! - Bind server to listener
//! - Stop gracefully when the shutdown signal fires

use axum::{extract::DefaultBodyLimit, middleware, routing::any, Router};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::cors::{cors_middleware, CorsPolicy};
use crate::http::handler::relay_handler;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::relay::{Relay, UpstreamSetupError};

/// Error starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Upstream setup failed: {0}")]
    Upstream(#[from] UpstreamSetupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub relay: Relay,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let config = Arc::new(config);
        let relay = Relay::new(&config)?;

        tracing::info!(
            endpoint = %relay.upstream().endpoint(),
            model = %relay.upstream().model(),
            "Upstream configured"
        );

        let state = AppState {
            config: config.clone(),
            relay,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let cors = Arc::new(CorsPolicy::from_config(&config.cors));

        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .with_state(state)
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Router with all layers, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
