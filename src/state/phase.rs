//! Run phase definitions for the crawl state machine
//!
//! A run moves strictly forward:
//! `Ranking -> Filtering -> Fetching -> Merging -> Saved`.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Pulling and sorting the bulk listing
    Ranking,

    /// Removing ids already present in the checkpoint
    Filtering,

    /// Fetching details for each remaining candidate
    Fetching,

    /// Combining new records with the prior checkpoint
    Merging,

    /// Checkpoint written; the run is over
    Saved,
}

impl CrawlPhase {
    /// Returns the phase that legally follows this one
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Ranking => Some(Self::Filtering),
            Self::Filtering => Some(Self::Fetching),
            Self::Fetching => Some(Self::Merging),
            Self::Merging => Some(Self::Saved),
            Self::Saved => None,
        }
    }

    /// Returns true if moving from `self` to `to` is allowed
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Returns true once nothing else will happen in this run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Saved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ranking => "ranking",
            Self::Filtering => "filtering",
            Self::Fetching => "fetching",
            Self::Merging => "merging",
            Self::Saved => "saved",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
