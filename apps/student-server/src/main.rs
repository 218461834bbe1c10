//! REST API server for student records.
//!
//! Loads configuration, opens the persistence gateway (applying schema
//! migrations), and serves the API until interrupted.

use std::net::SocketAddr;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use student_db_api::config::ApiConfig;
use student_db_api::{router::Router, server::Server};
use student_db_core::config::{DbConfig, DATABASE_URI_ENV};
use student_db_core::StudentGateway;

/// Command-line arguments for the student server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database connection string (sqlite://path, sqlite::memory: or a file path)
    #[arg(long, env = "DATABASE_URI")]
    database_uri: Option<String>,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = 8)]
    pool_size: u32,

    /// SQLite busy timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    busy_timeout_ms: u64,

    /// Request body read timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_body_bytes: usize,

    /// Time allowed for open connections to finish on shutdown, in milliseconds
    #[arg(long, default_value_t = 10000)]
    shutdown_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the environment.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_uri = match args.database_uri {
        Some(uri) if !uri.trim().is_empty() => uri,
        _ => bail!("{} environment variable is not set", DATABASE_URI_ENV),
    };

    let db_config = DbConfig {
        database_uri,
        pool_max_size: args.pool_size,
        busy_timeout_ms: args.busy_timeout_ms,
    };
    let gateway = StudentGateway::open(&db_config).context("Failed to open student database")?;

    let api_config = ApiConfig {
        request_timeout_ms: args.request_timeout_ms,
        max_body_bytes: args.max_body_bytes,
        shutdown_timeout_ms: args.shutdown_timeout_ms,
        ..Default::default()
    };
    let router = Router::new(gateway, api_config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;
    let server = Server::new(addr, router);

    tracing::info!(%addr, "Starting student records API");
    tracing::info!("API documentation: http://{}/apidocs", addr);

    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .with_context(|| format!("Server on {} failed", addr))?;

    tracing::info!("Server stopped, database connections closed");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
