//! Service broker daemon
//!
//! Exposes the Open Service Broker REST surface over the lifecycle control
//! plane, with a simulated provisioner standing in for the backing
//! resource.

use broker_daemon::{DaemonConfig, DaemonError, Server};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Broker daemon CLI
#[derive(Parser)]
#[command(name = "brokerd")]
#[command(about = "Service broker daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BROKER_CONFIG")]
    config: Option<String>,

    /// Listen address override, e.g. 127.0.0.1:8080
    #[arg(short, long, env = "BROKER_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "BROKER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "BROKER_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|err| DaemonError::Config(err.to_string()))?;

    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|err| DaemonError::Config(format!("Invalid listen address: {}", err)))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "starting service broker daemon"
    );

    let server = Server::new(config)?;
    server.run().await?;
    Ok(())
}
