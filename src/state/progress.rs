/// Per-run progress counters
///
/// Owned by the orchestrator for the duration of one run; never persisted.
/// `total` is fixed when filtering finishes, so the percentage reflects
/// attempts processed, not successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlProgress {
    /// Candidates left after filtering
    pub total: usize,

    /// Candidates processed so far, whatever the outcome
    pub attempted: usize,

    /// Candidates that produced a record
    pub succeeded: usize,

    /// Candidates the upstream reported as absent
    pub not_found: usize,

    /// Candidates dropped after exhausting retries
    pub dropped: usize,
}

/// Final outcome of one candidate within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Fetched,
    NotFound,
    Dropped,
}

impl CrawlProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Counts one processed candidate
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.attempted += 1;
        match outcome {
            ItemOutcome::Fetched => self.succeeded += 1,
            ItemOutcome::NotFound => self.not_found += 1,
            ItemOutcome::Dropped => self.dropped += 1,
        }
    }

    /// Percentage of candidates processed, in `0.0..=100.0`
    ///
    /// An empty run counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.attempted as f64 / self.total as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.attempted >= self.total
    }

    /// Single-line indicator, e.g. `  12/1000 fetched (  1.2%)`
    pub fn render(&self) -> String {
        format!(
            "{:4}/{} fetched ({:5.1}%)",
            self.attempted,
            self.total,
            self.percent()
        )
    }
}
