//! Load balancer binary.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use load_balancer::config::{load_config, ProxyConfig};
use load_balancer::observability::{logging, metrics};
use load_balancer::HttpServer;

#[derive(Parser)]
#[command(name = "load-balancer")]
#[command(about = "HTTP load-balancing reverse proxy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = ?config.strategy,
        targets = config.targets.len(),
        health_period_secs = config.health_check.period_secs,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = HttpServer::new(config).await?;
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
