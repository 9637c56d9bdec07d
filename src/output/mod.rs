//! Output module for operator-facing reports
//!
//! This module handles:
//! - Summarising an existing checkpoint (`--stats`)
//! - Describing what a run would do (`--dry-run`)
//! - Printing the end-of-run report

pub mod stats;

pub use stats::{compute_statistics, load_statistics, print_statistics, CheckpointStatistics};

use crate::config::Config;
use crate::crawler::CrawlReport;
use crate::storage::CheckpointStore;
use crate::HarvestError;

/// Prints the effective configuration and the state of the checkpoint
///
/// No network traffic happens here.
pub fn print_dry_run(
    config: &Config,
    store: &dyn CheckpointStore,
    resume: bool,
) -> Result<(), HarvestError> {
    println!("=== Steam-Harvest Dry Run ===\n");

    println!("Endpoints:");
    println!("  Listing: {}", config.endpoints.listing_url);
    println!("  Details: {}", config.endpoints.details_url);
    println!("  Reviews: {}", config.endpoints.reviews_url);

    println!("\nCrawler Configuration:");
    println!("  Top N: {}", config.crawler.top_n);
    println!("  Sleep between items: {}s", config.crawler.sleep_secs);
    println!(
        "  Attempts per item: {} (backoff {}s)",
        config.crawler.max_attempts,
        config.crawler.sleep_secs * 2.0
    );
    println!(
        "  Timeouts: listing {}s, detail {}s",
        config.crawler.listing_timeout_secs, config.crawler.detail_timeout_secs
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Checkpoint: {}", config.output.csv_path);
    if store.exists() {
        let known = store.load_known_ids()?;
        if resume {
            println!("  Resume: {} ids already fetched will be skipped", known.len());
        } else {
            println!(
                "  Existing checkpoint with {} rows will be replaced",
                known.len()
            );
        }
    } else {
        println!("  No checkpoint yet");
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Prints the end-of-run report
pub fn print_report(report: &CrawlReport) {
    println!();
    println!(
        "Saved {} rows → {}",
        report.rows_saved(),
        report.output_path.display()
    );
    tracing::info!(
        "Attempted {} of {} candidates ({} new rows) in {}s",
        report.progress.attempted,
        report.ranked,
        report.save.rows_added,
        report.duration_seconds()
    );
}
