//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::DaemonConfig;
use crate::error::DaemonResult;
use broker_control::BrokerControlPlane;
use broker_ledger::SimulatedProvisioner;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Broker daemon server
pub struct Server {
    config: DaemonConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let catalog = Arc::new(config.catalog.build());
        let provisioner = Arc::new(SimulatedProvisioner::new());
        let control = Arc::new(BrokerControlPlane::new(catalog, provisioner));
        let state = AppState::new(control);

        Ok(Self { config, state })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let app = create_router(self.state);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("service broker listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| crate::error::DaemonError::Server(err.to_string()))?;

        tracing::info!("service broker shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
