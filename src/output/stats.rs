//! Statistics generation from the checkpoint
//!
//! This module provides functionality for summarising an existing
//! checkpoint and displaying the summary.

use crate::record::ItemRecord;
use crate::storage::CheckpointStore;
use crate::HarvestError;
use std::collections::HashMap;

/// Number of genres listed in the summary
const TOP_GENRES: usize = 5;

/// Checkpoint statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointStatistics {
    /// Total number of rows
    pub total_rows: usize,

    /// Rows whose review aggregates are known
    pub rows_with_reviews: usize,

    /// Mean positive ratio over rows that have one
    pub mean_positive_ratio: Option<f64>,

    /// Rows flagged as multiplayer
    pub multiplayer: usize,

    /// Rows with a price of zero
    pub free: usize,

    /// Earliest and latest release year present
    pub release_year_range: Option<(i32, i32)>,

    /// Most frequent genres, most common first
    pub top_genres: Vec<(String, usize)>,
}

/// Computes statistics over a set of records
pub fn compute_statistics(records: &[ItemRecord]) -> CheckpointStatistics {
    let ratios: Vec<f64> = records.iter().filter_map(|r| r.positive_ratio).collect();
    let mean_positive_ratio = if ratios.is_empty() {
        None
    } else {
        Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
    };

    let release_year_range = records
        .iter()
        .filter_map(|r| r.release_year)
        .fold(None, |range, year| match range {
            None => Some((year, year)),
            Some((lo, hi)) => Some((i32::min(lo, year), i32::max(hi, year))),
        });

    let mut genre_counts: HashMap<&str, usize> = HashMap::new();
    for genre in records.iter().flat_map(|r| r.genres.iter()) {
        *genre_counts.entry(genre.as_str()).or_default() += 1;
    }
    let mut top_genres: Vec<(String, usize)> = genre_counts
        .into_iter()
        .map(|(genre, count)| (genre.to_string(), count))
        .collect();
    // Count descending, then name for a deterministic order
    top_genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_genres.truncate(TOP_GENRES);

    CheckpointStatistics {
        total_rows: records.len(),
        rows_with_reviews: records.iter().filter(|r| r.has_reviews()).count(),
        mean_positive_ratio,
        multiplayer: records.iter().filter(|r| r.is_multiplayer).count(),
        free: records.iter().filter(|r| r.price_usd == 0.0).count(),
        release_year_range,
        top_genres,
    }
}

/// Loads statistics from a checkpoint
///
/// # Returns
///
/// * `Ok(CheckpointStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - The checkpoint could not be read
pub fn load_statistics(store: &dyn CheckpointStore) -> Result<CheckpointStatistics, HarvestError> {
    let records = store.load_records()?;
    Ok(compute_statistics(&records))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CheckpointStatistics) {
    println!("=== Checkpoint Statistics ===\n");

    println!("Overview:");
    println!("  Total rows: {}", stats.total_rows);
    println!(
        "  Rows with reviews: {} ({:.1}%)",
        stats.rows_with_reviews,
        share(stats.rows_with_reviews, stats.total_rows)
    );
    match stats.mean_positive_ratio {
        Some(mean) => println!("  Mean positive ratio: {:.4}", mean),
        None => println!("  Mean positive ratio: n/a"),
    }
    println!(
        "  Multiplayer: {} ({:.1}%)",
        stats.multiplayer,
        share(stats.multiplayer, stats.total_rows)
    );
    println!(
        "  Free: {} ({:.1}%)",
        stats.free,
        share(stats.free, stats.total_rows)
    );
    if let Some((first, last)) = stats.release_year_range {
        println!("  Release years: {} - {}", first, last);
    }
    println!();

    if !stats.top_genres.is_empty() {
        println!("Top Genres:");
        for (genre, count) in &stats.top_genres {
            println!("  {}: {}", genre, count);
        }
    }
}

fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
