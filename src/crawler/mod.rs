//! Crawler module for ranking, fetching and checkpointing
//!
//! This module contains the core harvesting logic, including:
//! - Ranking the bulk listing into a candidate population
//! - Fetching per-app metadata and review summaries
//! - Bounded retry and inter-request pacing
//! - Overall run orchestration

mod coordinator;
mod detail;
mod fetcher;
mod limiter;
mod population;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{filter_known, run_crawl, CrawlOptions, CrawlOrchestrator, CrawlReport};
pub use detail::{DetailFetcher, SummaryOutcome};
pub use fetcher::{build_http_client, HttpTransport, JsonTransport, TransportError};
pub use limiter::{RateLimiter, Sleeper, TokioSleeper};
pub use population::{rank_listing, RankedCandidate, RankedPopulationSource, SourceError};
pub use retry::{FetchOutcome, RetryOutcome, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
