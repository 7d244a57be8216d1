use std::net::IpAddr;

use anyhow::{Context, Result};
use clap::Parser;
use genie_backend::{BackendConfig, BackendServer};
use genie_state::logging::{init_logging, LoggingMode};
use tracing::info;

/// Simulated genie-home backend
///
/// Serves an in-memory device table, scenes, moods and a keyword chat agent
/// over the same JSON interface the SDK talks to.
#[derive(Parser, Debug)]
#[command(name = "genie-backend")]
#[command(about = "Simulated genie-home backend")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Unlike the SDK, the server logs by default
    let mode = std::env::var("GENIE_LOG_MODE")
        .map(|value| LoggingMode::from_env_value(&value))
        .unwrap_or(LoggingMode::Development);
    init_logging(mode).context("failed to initialise logging")?;

    let config = BackendConfig {
        host: args.host,
        port: args.port,
    };
    let server = BackendServer::start(config)
        .await
        .with_context(|| format!("failed to start on {}", config.socket_addr()))?;

    info!("Serving API at {}", server.api_url());
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    info!("Shutting down");
    server.shutdown().await;
    Ok(())
}
