//! Health-aware HTTP load balancer (v1)
//!
//! Forwards every request to the next healthy backend in a fixed pool and
//! streams health and routing events to WebSocket observers.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────────┐
//!                        │                   LOAD BALANCER                   │
//!                        │                                                   │
//!   Client Request       │  ┌─────────┐   ┌─────────────┐   ┌────────────┐   │
//!   ─────────────────────┼─▶│  http   │──▶│ round_robin │──▶│   proxy    │───┼──▶ Backend
//!                        │  │ server  │   │  + pool     │   │  forward   │   │
//!                        │  └────┬────┘   └──────▲──────┘   └─────┬──────┘   │
//!                        │       │               │ health        │ request  │
//!                        │       │        ┌──────┴──────┐        │ events   │
//!                        │       │        │   health    │────────┤          │
//!                        │       │        │   monitor   │ status │          │
//!                        │       │        └─────────────┘ events ▼          │
//!   Observers (/ws)      │  ┌────▼────┐                  ┌────────────┐      │
//!   ◀────────────────────┼──│websocket│◀─────────────────│broadcaster │      │
//!                        │  └─────────┘                  └────────────┘      │
//!                        └───────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use health_balancer::config::loader::{default_config, load_config};
use health_balancer::lifecycle::{signals, Shutdown};
use health_balancer::observability::{logging, metrics};
use health_balancer::HttpServer;

#[derive(Parser)]
#[command(name = "health-balancer")]
#[command(about = "Health-aware round-robin HTTP load balancer", long_about = None)]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };

    logging::init(&config.observability);

    tracing::info!("health-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        fallback = ?config.routing.fallback,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, shutdown)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
