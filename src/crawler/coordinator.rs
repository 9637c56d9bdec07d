//! Crawl orchestrator - main crawl orchestration logic
//!
//! This module contains the run loop that composes all parts of a harvest:
//! - Ranking the population and filtering ids already in the checkpoint
//! - Fetching each remaining candidate under the retry policy and limiter
//! - Tracking progress and rendering the progress line
//! - Merging the new records into the checkpoint exactly once, at the end
//!
//! Item-level failures never leave the item boundary. Only a failed listing
//! or a checkpoint I/O failure ends the run with an error.

use crate::config::Config;
use crate::crawler::detail::DetailFetcher;
use crate::crawler::fetcher::{HttpTransport, JsonTransport};
use crate::crawler::limiter::{RateLimiter, Sleeper, TokioSleeper};
use crate::crawler::population::RankedPopulationSource;
use crate::crawler::retry::{RetryOutcome, RetryPolicy};
use crate::record::{CandidateId, ItemRecord};
use crate::state::{CrawlPhase, CrawlProgress, ItemOutcome};
use crate::storage::{CheckpointStore, CsvCheckpoint, SaveSummary};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-run switches that are not part of the configuration file
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlOptions {
    /// Skip ids already in the checkpoint and merge into it
    pub resume: bool,

    /// Render the single-line progress indicator
    pub show_progress: bool,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Candidates returned by the ranking
    pub ranked: usize,

    /// Ids already in the checkpoint when the run started
    pub known: usize,

    pub progress: CrawlProgress,
    pub save: SaveSummary,
    pub output_path: PathBuf,
}

impl CrawlReport {
    /// Rows now in the checkpoint
    pub fn rows_saved(&self) -> usize {
        self.save.rows_total
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Main crawl orchestrator
///
/// Owns every piece of per-run state (phase, progress, accumulated records),
/// so independent runs never share anything.
pub struct CrawlOrchestrator<S: CheckpointStore> {
    config: Arc<Config>,
    options: CrawlOptions,
    source: RankedPopulationSource,
    fetcher: DetailFetcher,
    retry: RetryPolicy,
    limiter: RateLimiter,
    sleeper: Arc<dyn Sleeper>,
    store: S,
    output_path: PathBuf,
    phase: CrawlPhase,
    progress: CrawlProgress,
    buffer: Vec<ItemRecord>,
}

impl CrawlOrchestrator<CsvCheckpoint> {
    /// Creates an orchestrator talking to the real upstream
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `options` - Resume and progress switches
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOrchestrator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config, options: CrawlOptions) -> Result<Self, HarvestError> {
        let transport = Arc::new(HttpTransport::from_config(&config.user_agent)?);
        let store = CsvCheckpoint::new(&config.output.csv_path);
        Ok(Self::with_parts(
            config,
            options,
            transport,
            Arc::new(TokioSleeper),
            store,
        ))
    }
}

impl<S: CheckpointStore> CrawlOrchestrator<S> {
    /// Assembles an orchestrator from explicit collaborators
    pub fn with_parts(
        config: Config,
        options: CrawlOptions,
        transport: Arc<dyn JsonTransport>,
        sleeper: Arc<dyn Sleeper>,
        store: S,
    ) -> Self {
        let crawler = &config.crawler;
        let source = RankedPopulationSource::new(
            transport.clone(),
            config.endpoints.listing_url.clone(),
            crawler.listing_timeout(),
        );
        let fetcher = DetailFetcher::new(
            transport,
            config.endpoints.clone(),
            crawler.detail_timeout(),
        );
        let retry = RetryPolicy::new(crawler.max_attempts, crawler.sleep_interval());
        let limiter = RateLimiter::new(crawler.sleep_interval(), sleeper.clone());
        let output_path = PathBuf::from(&config.output.csv_path);

        Self {
            config: Arc::new(config),
            options,
            source,
            fetcher,
            retry,
            limiter,
            sleeper,
            store,
            output_path,
            phase: CrawlPhase::Ranking,
            progress: CrawlProgress::default(),
            buffer: Vec::new(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn progress(&self) -> CrawlProgress {
        self.progress
    }

    /// Runs the whole pipeline
    ///
    /// `Ranking -> Filtering -> Fetching -> Merging -> Saved`. The checkpoint
    /// is touched only in the last step, so an interrupted run leaves the
    /// previous file as it was.
    pub async fn run(mut self) -> Result<CrawlReport, HarvestError> {
        let started_at = Utc::now();

        // Ranking
        let ranked = self.source.list_top_n(self.config.crawler.top_n).await?;

        // Filtering
        self.advance(CrawlPhase::Filtering)?;
        let known = if self.options.resume {
            let known = self.store.load_known_ids()?;
            tracing::info!(
                "Resume mode: {} rows already in {}, will skip them",
                known.len(),
                self.output_path.display()
            );
            known
        } else {
            HashSet::new()
        };
        let remaining = filter_known(&ranked, &known);
        tracing::info!(
            "{} of {} ranked candidates left to fetch",
            remaining.len(),
            ranked.len()
        );

        // Fetching
        self.advance(CrawlPhase::Fetching)?;
        self.fetch_all(&remaining).await;

        // Merging
        self.advance(CrawlPhase::Merging)?;
        let buffer = std::mem::take(&mut self.buffer);
        let save = self.store.save(&buffer, self.options.resume)?;

        self.advance(CrawlPhase::Saved)?;
        tracing::info!(
            "Run finished: {} fetched, {} not found, {} dropped; {} rows in checkpoint",
            self.progress.succeeded,
            self.progress.not_found,
            self.progress.dropped,
            save.rows_total
        );

        Ok(CrawlReport {
            started_at,
            finished_at: Utc::now(),
            ranked: ranked.len(),
            known: known.len(),
            progress: self.progress,
            save,
            output_path: self.output_path,
        })
    }

    /// Fetches every candidate in order, one at a time
    async fn fetch_all(&mut self, candidates: &[CandidateId]) {
        self.progress = CrawlProgress::new(candidates.len());
        let bar = self.progress_bar();

        for &appid in candidates {
            self.limiter.throttle().await;

            let outcome = self.fetch_one(appid).await;
            self.progress.record(outcome);

            bar.inc(1);
            bar.set_message(self.progress.render());
        }

        bar.finish();
    }

    /// Fetches a single candidate under the retry policy
    async fn fetch_one(&mut self, appid: CandidateId) -> ItemOutcome {
        let fetcher = &self.fetcher;
        let outcome = self
            .retry
            .run(self.sleeper.as_ref(), |_| fetcher.fetch_detail(appid))
            .await;

        match outcome {
            RetryOutcome::Success { value, attempts } => {
                tracing::debug!("Fetched {} in {} attempt(s)", appid, attempts);
                self.buffer.push(value);
                ItemOutcome::Fetched
            }
            RetryOutcome::NotFound { .. } => {
                tracing::debug!("App {} not available upstream, skipping", appid);
                ItemOutcome::NotFound
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                tracing::warn!(
                    "Dropping {} after {} attempts: {}",
                    appid,
                    attempts,
                    last_error
                );
                ItemOutcome::Dropped
            }
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(self.progress.total as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(self.progress.render());
        bar
    }

    fn advance(&mut self, to: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        tracing::debug!("Phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Removes known ids, keeping the ranking order
pub fn filter_known(ranked: &[CandidateId], known: &HashSet<CandidateId>) -> Vec<CandidateId> {
    ranked
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect()
}

/// Runs a complete harvest against the configured upstream and checkpoint
///
/// # Example
///
/// ```no_run
/// use steam_harvest::config::Config;
/// use steam_harvest::crawler::{run_crawl, CrawlOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default(), CrawlOptions::default()).await?;
/// println!("{} rows", report.rows_saved());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, options: CrawlOptions) -> Result<CrawlReport, HarvestError> {
    CrawlOrchestrator::new(config, options)?.run().await
}
