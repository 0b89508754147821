//! MiniDB Server Binary
//!
//! Starts the TCP server for MiniDB.

use std::sync::Arc;

use clap::Parser;
use minidb::config::SyncStrategy;
use minidb::network::Server;
use minidb::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// MiniDB Server
#[derive(Parser, Debug)]
#[command(name = "minidb-server")]
#[command(about = "Small relational database over append-only table files")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./minidb_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5555")]
    listen: String,

    /// Session worker threads (max concurrently served clients)
    #[arg(short, long, default_value = "32")]
    workers: usize,

    /// Read timeout per session in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Call fsync after every append
    #[arg(long)]
    fsync: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,minidb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("MiniDB Server v{}", minidb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = if args.fsync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::Flush
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .sync_strategy(sync_strategy)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
