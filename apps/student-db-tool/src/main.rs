//! CLI tool for schema management and database inspection.
//!
//! Provides commands for:
//! - Applying pending schema migrations
//! - Reporting the applied schema version
//! - Checking that the database can be opened and queried

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use student_db_core::config::{DbConfig, DATABASE_URI_ENV};
use student_db_core::migrations;
use student_db_core::StudentGateway;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string (sqlite://path, sqlite::memory: or a file path)
    #[arg(long, global = true, env = "DATABASE_URI")]
    database_uri: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply all pending migrations
    Migrate,
    /// Show applied and latest schema versions
    Status,
    /// Open the database, run a trivial query and report the record count
    Check,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let database_uri = match cli.database_uri {
        Some(uri) if !uri.trim().is_empty() => uri,
        _ => bail!("{} environment variable is not set", DATABASE_URI_ENV),
    };
    let config = DbConfig {
        pool_max_size: 1,
        ..DbConfig::new(database_uri)
    };
    tracing::debug!(target_db = ?config.target(), "Resolved database target");

    match cli.command {
        Command::Migrate => {
            let before = migrations::inspect(&config).context("Failed to read schema version")?;
            let gateway = StudentGateway::open(&config).context("Failed to migrate database")?;
            let after = gateway.schema_version()?;
            if after == before.current {
                println!("Schema already up to date at version {}", after);
            } else {
                println!("Migrated schema from version {} to {}", before.current, after);
            }
        }
        Command::Status => {
            let status = migrations::inspect(&config).context("Failed to read schema version")?;
            println!("Current version: {}", status.current);
            println!("Latest version:  {}", status.latest);
            if status.current > status.latest {
                println!("Database was migrated by a newer release");
            } else {
                println!("Pending migrations: {}", status.pending());
            }
        }
        Command::Check => {
            let gateway = StudentGateway::open(&config).context("Failed to open database")?;
            gateway.ping().context("Database did not answer")?;
            println!("Database OK ({:?})", gateway.target());
            println!("Students: {}", gateway.count()?);
        }
    }

    Ok(())
}
