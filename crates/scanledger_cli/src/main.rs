//! Scan ledger CLI
//!
//! Command-line operator surface for the scan ledger.
//!
//! # Commands
//!
//! - `scan` - Record codes for a courier, from arguments or a stdin loop
//! - `list` - Show records, optionally per courier or oldest first
//! - `summary` - Show totals and per-courier counts
//! - `remove` - Remove one record by id
//! - `dedupe` - Remove records flagged as duplicates
//! - `clear` - Remove every record
//! - `sync` - Push unsynced records to the remote store
//! - `status` - Show ledger counts and the sync cursor

mod commands;
mod config;
mod http;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scan ledger command-line tools.
#[derive(Parser)]
#[command(name = "scanledger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    data_dir: Option<PathBuf>,

    /// Path to the config file (default: scanledger.json when present)
    #[arg(global = true, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record scanned codes for a courier
    Scan {
        /// Courier category for this batch
        #[arg(short, long)]
        courier: String,

        /// Codes to record; reads stdin line by line when omitted
        codes: Vec<String>,
    },

    /// List records
    List {
        /// Only records for this courier
        #[arg(short, long)]
        courier: Option<String>,

        /// Oldest first instead of newest first
        #[arg(long)]
        oldest_first: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show totals and per-courier counts
    Summary {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove one record by id
    Remove {
        /// Record id, as shown by list
        id: String,
    },

    /// Remove every record flagged as a duplicate
    Dedupe {
        /// Show what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove all records
    Clear {
        /// Confirm the wipe
        #[arg(short, long)]
        force: bool,
    },

    /// Push unsynced records to the remote store
    Sync {
        /// Webhook URL (overrides SCANLEDGER_ENDPOINT and the config file)
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Show ledger counts and the sync cursor
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::CliConfig::load(cli.config.as_deref())?;
    let data_dir = cli
        .data_dir
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_DATA_DIR));

    match cli.command {
        Commands::Scan { courier, codes } => {
            commands::scan::run(&data_dir, &config, &courier, codes)?;
        }
        Commands::List {
            courier,
            oldest_first,
            format,
        } => {
            commands::list::run(&data_dir, &config, courier.as_deref(), oldest_first, &format)?;
        }
        Commands::Summary { format } => {
            commands::summary::run(&data_dir, &format)?;
        }
        Commands::Remove { id } => {
            commands::remove::run(&data_dir, &id)?;
        }
        Commands::Dedupe { dry_run } => {
            commands::dedupe::run(&data_dir, dry_run)?;
        }
        Commands::Clear { force } => {
            commands::clear::run(&data_dir, force)?;
        }
        Commands::Sync { endpoint } => {
            let env_endpoint = std::env::var(config::ENDPOINT_ENV).ok();
            let endpoint = config.resolve_endpoint(endpoint.as_deref(), env_endpoint.as_deref());
            commands::sync::run(&data_dir, &config, endpoint)?;
        }
        Commands::Status { format } => {
            commands::status::run(&data_dir, &format)?;
        }
        Commands::Version => {
            println!("scanledger CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("scanledger core v{}", scanledger_core::VERSION);
        }
    }

    Ok(())
}
