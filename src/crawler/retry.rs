//! Bounded retry for per-item fetches
//!
//! A fetch reports one of three outcomes ([`FetchOutcome`]). Only
//! `Transient` is retried; `NotFound` is final on the spot. Before each retry
//! the policy pauses for twice the base interval.
//!
//! | Outcome | Action |
//! |---------|--------|
//! | Success | Return the value |
//! | NotFound | Stop, no retry |
//! | Transient | Pause `2 x base`, retry until `max_attempts` is reached |

use crate::crawler::limiter::Sleeper;
use std::future::Future;
use std::time::Duration;

/// Default total attempts per item, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff pause as a multiple of the base interval
const BACKOFF_MULTIPLIER: u32 = 2;

/// Result of one attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The item was fetched
    Success(T),

    /// The upstream definitively reports the item as absent
    NotFound,

    /// Network or parse failure worth another try
    Transient(String),
}

/// Result of a fetch after the policy is done with it
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Success { value: T, attempts: u32 },
    NotFound { attempts: u32 },
    Exhausted { attempts: u32, last_error: String },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::NotFound { attempts }
            | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Retry configuration for item fetches
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt)
    max_attempts: u32,

    /// Pause before each retry
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(300))
    }
}

impl RetryPolicy {
    /// Creates a policy pausing `2 x base_interval` between attempts
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: base_interval * BACKOFF_MULTIPLIER,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Runs `op` until it succeeds, reports absence, or runs out of attempts
    ///
    /// `op` receives the 1-indexed attempt number.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = FetchOutcome<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                FetchOutcome::Success(value) => {
                    return RetryOutcome::Success {
                        value,
                        attempts: attempt,
                    }
                }
                FetchOutcome::NotFound => return RetryOutcome::NotFound { attempts: attempt },
                FetchOutcome::Transient(error) => {
                    if attempt >= self.max_attempts {
                        return RetryOutcome::Exhausted {
                            attempts: attempt,
                            last_error: error,
                        };
                    }

                    tracing::warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        error,
                        self.backoff
                    );
                    sleeper.sleep(self.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
