//! Steam-Harvest main entry point
//!
//! This is the command-line interface for the resumable Steam catalogue harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use steam_harvest::config::{resolve_config, Config, ConfigOverrides};
use steam_harvest::crawler::{run_crawl, CrawlOptions};
use steam_harvest::output::{load_statistics, print_dry_run, print_report, print_statistics};
use steam_harvest::storage::{CheckpointStore, CsvCheckpoint};
use tracing_subscriber::EnvFilter;

/// Steam-Harvest: a resumable, rate-limited catalogue harvester
///
/// Steam-Harvest ranks the public app listing by owner estimate, fetches
/// store metadata and review aggregates for the top entries, and merges the
/// results into a CSV checkpoint that later runs can resume from.
#[derive(Parser, Debug)]
#[command(name = "steam-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable, rate-limited Steam catalogue harvester", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of top-ranked apps to harvest
    #[arg(short = 'n', long, value_name = "N")]
    top_n: Option<usize>,

    /// Seconds to wait between apps (retries back off twice as long)
    #[arg(long, value_name = "SECS")]
    sleep: Option<f64>,

    /// Path of the CSV checkpoint
    #[arg(long, value_name = "PATH")]
    out: Option<String>,

    /// Skip apps already in the checkpoint and merge new rows into it
    #[arg(long)]
    resume: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without any network traffic
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the checkpoint and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            top_n: self.top_n,
            sleep_secs: self.sleep,
            csv_path: self.out.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let (config, hash) = resolve_config(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;
    match hash {
        Some(hash) => tracing::info!("Configuration loaded successfully (hash: {})", hash),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, cli.resume)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.resume, !cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("steam_harvest=info,warn"),
            1 => EnvFilter::new("steam_harvest=debug,info"),
            2 => EnvFilter::new("steam_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, resume: bool) -> anyhow::Result<()> {
    let store = CsvCheckpoint::new(&config.output.csv_path);
    print_dry_run(config, &store, resume)?;
    Ok(())
}

/// Handles the --stats mode: shows statistics from the checkpoint
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Checkpoint: {}\n", config.output.csv_path);

    let store = CsvCheckpoint::new(&config.output.csv_path);
    if !store.exists() {
        anyhow::bail!("No checkpoint at {}", config.output.csv_path);
    }

    let stats = load_statistics(&store)
        .with_context(|| format!("Failed to read {}", config.output.csv_path))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_crawl(config: Config, resume: bool, show_progress: bool) -> anyhow::Result<()> {
    if resume {
        tracing::info!("Starting harvest (resuming from {})", config.output.csv_path);
    } else {
        tracing::info!("Starting fresh harvest");
    }

    tracing::info!(
        "Top {} apps, {}s between requests, {} attempts per app",
        config.crawler.top_n,
        config.crawler.sleep_secs,
        config.crawler.max_attempts
    );

    let options = CrawlOptions {
        resume,
        show_progress,
    };

    // Run the harvester
    match run_crawl(config, options).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
