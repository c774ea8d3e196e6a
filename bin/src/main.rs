//! pollwise CLI - adaptive update scheduling for manga and anime libraries.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use pollwise_lib::{LibraryStore, SeriesId};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;

use commands::Session;
use config::Config;

#[derive(Parser)]
#[command(name = "pollwise")]
#[command(about = "Adaptive update scheduling for manga and anime libraries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Library directory. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file. Defaults to <data-dir>/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// IANA time zone for day boundaries (overrides the configuration)
    #[arg(long, global = true)]
    zone: Option<String>,

    /// Reference time (RFC 3339). Defaults to now.
    #[arg(long, global = true)]
    at: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute fetch intervals and next poll times for the library
    Schedule {
        /// Only reschedule series that are due within the poll window
        #[arg(long)]
        due: bool,

        /// Show the changes without saving them
        #[arg(long)]
        dry_run: bool,

        /// Maximum concurrent history reads (overrides the configuration)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List tracked series
    List {
        /// Show only series due within the poll window
        #[arg(long)]
        due: bool,
    },

    /// Show schedule details for a series
    Info {
        /// Series identifier
        id: SeriesId,
    },

    /// Show the poll window around the reference time
    Window,

    /// Start tracking a series
    Add {
        /// Series identifier
        id: SeriesId,

        /// Display title
        title: String,
    },

    /// Record a newly observed chapter or episode
    Record {
        /// Series identifier
        id: SeriesId,

        /// Source-declared publish time (epoch ms, RFC 3339, or YYYY-MM-DD)
        #[arg(long)]
        upload: Option<String>,

        /// Local observation time. Defaults to the reference time.
        #[arg(long)]
        fetch: Option<String>,

        /// Mark the item as a cross-posted duplicate release
        #[arg(long)]
        duplicate: bool,
    },

    /// Pin the fetch interval of a series to a fixed number of days
    Pin {
        /// Series identifier
        id: SeriesId,

        /// Interval in days (1-28)
        days: i64,
    },

    /// Remove a manual pin so the interval is estimated again
    Unpin {
        /// Series identifier
        id: SeriesId,
    },

    /// Stop tracking a series
    Remove {
        /// Series identifier
        id: SeriesId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let data_dir = cli.data_dir.unwrap_or_else(LibraryStore::default_path);
    let config_path = cli
        .config
        .unwrap_or_else(|| Config::default_file(&data_dir));
    let mut config = Config::from_file(&config_path)?;
    if let Some(zone) = cli.zone {
        config.time_zone = zone;
    }

    init_logging(cli.verbose, cli.quiet, &config.log_level)?;
    tracing::debug!(path = %config_path.display(), ?config, "Configuration loaded");

    let zone = config.zone()?;
    let reference = display::parse_reference(cli.at.as_deref(), &zone)?;
    let store = LibraryStore::new(data_dir).context("Failed to open library")?;

    let session = Session {
        store: Arc::new(store),
        config,
        zone,
        reference,
        quiet: cli.quiet,
    };

    match command {
        Commands::Schedule {
            due,
            dry_run,
            concurrency,
        } => commands::schedule::schedule(&session, due, dry_run, concurrency).await,
        Commands::List { due } => commands::list::list_series(&session, due),
        Commands::Info { id } => commands::info::show_info(&session, id),
        Commands::Window => commands::info::show_window(&session),
        Commands::Add { id, title } => commands::series::add(&session, id, &title),
        Commands::Record {
            id,
            upload,
            fetch,
            duplicate,
        } => commands::series::record(
            &session,
            id,
            upload.as_deref(),
            fetch.as_deref(),
            duplicate,
        ),
        Commands::Pin { id, days } => commands::series::pin(&session, id, days),
        Commands::Unpin { id } => commands::series::unpin(&session, id),
        Commands::Remove { id } => commands::series::remove(&session, id),
    }
}

/// Installs the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `-v` flags raise the configured level.
fn init_logging(verbose: u8, quiet: bool, default_level: &str) -> Result<()> {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => default_level,
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pollwise={level},pollwise_library={level},pollwise_interval={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
