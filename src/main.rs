//! # Terraform Log Harness CLI (`tflog`)
//!
//! The `tflog` binary ingests Terraform log files into a local SQLite index
//! and queries it.
//!
//! ## Usage
//!
//! ```bash
//! tflog --config ./config/tflog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tflog init` | Create the SQLite database and schema |
//! | `tflog ingest <path>` | Ingest a log file or a directory of log files |
//! | `tflog search` | Filtered search over ingested lines |
//! | `tflog get <id>` | Show one record and its embedded bodies |
//! | `tflog mark-read <ids>` | Mark records as read |
//! | `tflog sections` | Per-phase counts and time span |
//! | `tflog stats` | Record, level and section overview |
//! | `tflog export` | Write matching raw lines as JSON Lines |
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG=debug` to see
//! per-line extraction results.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tflog_harness::models::{Level, SearchFilters, Section};
use tflog_harness::{config, export, get, ingest, migrate, search, stats};

/// Terraform Log Harness: heuristic extraction and indexed search for
/// Terraform execution logs.
#[derive(Parser)]
#[command(
    name = "tflog",
    about = "Terraform Log Harness — heuristic extraction and indexed search for Terraform logs",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tflog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Filters shared by `search` and `export`.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Substring to look for in the raw line or its excerpt.
    #[arg(long)]
    q: Option<String>,

    /// Exact level: error, warning, info, or debug.
    #[arg(long)]
    level: Option<Level>,

    /// Substring of the resource identifier.
    #[arg(long)]
    resource: Option<String>,

    /// Exact request id.
    #[arg(long = "req-id")]
    req_id: Option<String>,

    /// Lower bound on the timestamp (string comparison).
    #[arg(long)]
    from: Option<String>,

    /// Upper bound on the timestamp (string comparison).
    #[arg(long)]
    to: Option<String>,

    /// Exact section: plan, apply, start, end, refresh, plan_summary, apply_summary.
    #[arg(long)]
    section: Option<Section>,

    /// Only records not yet marked read.
    #[arg(long)]
    unread: bool,

    /// Maximum number of records (at least 1).
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    limit: Option<i64>,
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        SearchFilters {
            q: args.q,
            level: args.level,
            resource: args.resource,
            tf_req_id: args.req_id,
            ts_from: args.from,
            ts_to: args.to,
            section: args.section,
            unread_only: args.unread,
            limit: args.limit,
        }
    }
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite file, the `logs` and `json_bodies` tables and
    /// their indexes. Safe to run repeatedly.
    Init,

    /// Ingest a log file, or every matching file under a directory.
    ///
    /// Each non-blank line becomes one record, whether or not it is JSON.
    Ingest {
        /// File or directory to read.
        path: PathBuf,
    },

    /// Search ingested records, newest first.
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a record and its embedded bodies.
    Get {
        /// Record id.
        id: i64,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Mark records as read.
    MarkRead {
        /// Record ids.
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Per-section counts with earliest and latest timestamp.
    Sections {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show record, level and section totals.
    Stats,

    /// Export matching raw lines as JSON Lines.
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { path } => {
            ingest::run_ingest(&cfg, &path).await?;
        }
        Commands::Search { filters, json } => {
            search::run_search(&cfg, filters.into(), json).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&cfg, id, json).await?;
        }
        Commands::MarkRead { ids } => {
            search::run_mark_read(&cfg, &ids).await?;
        }
        Commands::Sections { json } => {
            stats::run_sections(&cfg, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Export { filters, output } => {
            export::run_export(&cfg, filters.into(), output.as_deref()).await?;
        }
    }

    Ok(())
}
