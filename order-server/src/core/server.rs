//! Server Implementation
//!
//! HTTP + WebSocket listener and graceful shutdown

use std::net::SocketAddr;

use crate::api;
use crate::core::{Config, ServerState};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<(), BoxError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Bring menu availability in line with whatever stock is on disk
        if let Err(e) = state.availability.recompute_all().await {
            tracing::warn!(error = %e, "Initial availability recompute failed");
        }

        let app = api::router(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Order server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Order server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down...");
}
