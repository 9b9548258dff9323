//! HTTP API server for the Ember hub

pub mod health;
pub mod hub;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::hub::HubManager;
use crate::Result;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// The orchestration manager every handler delegates to
    pub hub: Arc<HubManager>,
}

/// HTTP API server
pub struct ApiServer {
    state: ApiState,
    port: u16,
}

impl ApiServer {
    /// Create a server for the given hub manager
    #[must_use]
    pub const fn new(hub: Arc<HubManager>, port: u16) -> Self {
        Self {
            state: ApiState { hub },
            port,
        }
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let router = Router::new()
            .nest("/api/drivers", hub::drivers_router(self.state.clone()))
            .nest("/api/devices", hub::devices_router(self.state.clone()))
            .merge(health::router());

        // CORS layer for cross-origin requests from remote apps
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
