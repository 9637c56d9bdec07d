//! State module for tracking crawl progress
//!
//! This module provides the per-run state owned by the orchestrator.
//!
//! # Components
//!
//! - `CrawlPhase`: Where the run is in `Ranking -> Filtering -> Fetching -> Merging -> Saved`
//! - `CrawlProgress`: Attempt/success counters behind the progress line
//! - `ItemOutcome`: How a single candidate ended

mod phase;
mod progress;

// Re-export main types
pub use phase::CrawlPhase;
pub use progress::{CrawlProgress, ItemOutcome};
