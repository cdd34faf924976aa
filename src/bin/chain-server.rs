#![forbid(unsafe_code)]
//! HTTP server exposing per-session demo ledgers

use blockchain_demo::api::{run_api_server, AppState};
use blockchain_demo::config::{load_config, load_config_from};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(version, about = "Serve the blockchain demo over HTTP")]
struct Args {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Address to bind, overriding `server.host`.
    #[arg(long)]
    host: Option<IpAddr>,
    /// Port to bind, overriding `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    tracing_subscriber::fmt()
        .with_max_level(config.logging.tracing_level()?)
        .init();

    let host = match args.host {
        Some(host) => host,
        None => config.server.host.parse()?,
    };
    let port = args.port.unwrap_or(config.server.port);
    let addr = SocketAddr::new(host, port);

    tracing::info!(
        max_sessions = config.server.max_sessions,
        proof_min = config.mining.proof_min,
        proof_max = config.mining.proof_max,
        "starting blockchain demo server"
    );

    let state = Arc::new(AppState::new(&config));
    run_api_server(state, addr).await
}
