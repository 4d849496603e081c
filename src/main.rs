//! LineKV - An In-Memory, Multi-Type Key-Value Store
//!
//! This is the main entry point for the LineKV server.
//! It sets up logging, the TCP listener and the shared storage engine, then
//! hands every accepted client to its own task.

use anyhow::Context;
use linekv::commands::CommandHandler;
use linekv::config::{Action, Config, HELP};
use linekv::connection::{handle_connection, ConnectionStats};
use linekv::protocol::LineParser;
use linekv::storage::StorageEngine;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_banner(config: &Config) {
    println!(
        r#"
LineKV v{} - In-Memory, Multi-Type Key-Value Store
──────────────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        linekv::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(Action::Run(config)) => config,
        Ok(Action::Help) => {
            println!("{}", HELP);
            return Ok(());
        }
        Ok(Action::Version) => {
            println!("LineKV version {}", linekv::VERSION);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", HELP);
            std::process::exit(1);
        }
    };

    // Set up logging, RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level: {}", config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Shared by every connection
    let storage = Arc::new(StorageEngine::new());
    info!("Storage engine initialized with 64 shards");

    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;

    print_banner(&config);
    let parser = LineParser::with_max_line_length(config.max_line_length);
    info!(
        address = %config.bind_address(),
        max_line_length = parser.max_line_length(),
        "Listening"
    );

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&storage), Arc::clone(&stats), parser) => {}
        _ = shutdown => {}
    }

    let storage_stats = storage.stats();
    info!(
        keys = storage_stats.total_keys(),
        operations = storage_stats.total_ops(),
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
    parser: LineParser,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = CommandHandler::new(Arc::clone(&storage));
                let parser = parser.clone();
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, parser, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
