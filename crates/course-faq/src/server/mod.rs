//! HTTP server for the FAQ assistant

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::FaqConfig;
use crate::error::{Error, Result};
use crate::secrets::SecretStore;
use state::AppState;

/// FAQ HTTP Server
pub struct FaqServer {
    config: FaqConfig,
    state: AppState,
}

impl FaqServer {
    /// Create a new server, selecting the provider from configuration
    pub fn new(config: FaqConfig, secrets: &dyn SecretStore) -> Result<Self> {
        let state = AppState::from_config(config.clone(), secrets)?;
        Ok(Self { config, state })
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.state);

        tracing::info!("Starting FAQ server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    let server = state.config().server.clone();

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes(server.max_upload_size))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if server.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
