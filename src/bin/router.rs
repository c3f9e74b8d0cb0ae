//! ptp-router Binary
//!
//! Starts the peer-to-peer router.

use clap::Parser;
use ptprouter::{Config, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// Peer-to-peer router
#[derive(Parser, Debug)]
#[command(name = "ptp-router")]
#[command(about = "Minimal peer-registry router with a text-based relay protocol")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(default_value = "80")]
    port: u16,

    /// Interface to bind
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Maximum concurrent peer connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Version string answered to version queries
    #[arg(long)]
    router_version: Option<String>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ptprouter=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Peer to Peer Router v{}; starting at port {}", ptprouter::VERSION, args.port);

    // Build config from args
    let mut builder = Config::builder()
        .listen_addr(format!("{}:{}", args.bind, args.port))
        .max_connections(args.max_connections);
    if let Some(version) = args.router_version {
        builder = builder.router_version(version);
    }
    let config = builder.build();

    let server = match Server::bind(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start router: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Router error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Router stopped");
}
