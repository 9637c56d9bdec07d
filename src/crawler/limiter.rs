//! Pacing between item fetches
//!
//! One [`RateLimiter`] exists per run. It is independent of the retry
//! backoff: the pause it inserts happens between items, the backoff happens
//! between attempts on the same item.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Something that can wait
///
/// The runtime implementation is [`TokioSleeper`]; tests record the requested
/// pauses instead of waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Enforces a fixed pause between successive item-level fetches
pub struct RateLimiter {
    interval: Duration,
    sleeper: Arc<dyn Sleeper>,
    primed: bool,
}

impl RateLimiter {
    /// Creates a limiter pausing `interval` between items
    pub fn new(interval: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            interval,
            sleeper,
            primed: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits before the next item
    ///
    /// The first call returns immediately since nothing has been requested
    /// yet; every later call sleeps the full interval.
    pub async fn throttle(&mut self) {
        if !self.primed {
            self.primed = true;
            return;
        }

        tracing::trace!("Throttling for {:?}", self.interval);
        self.sleeper.sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::RecordingSleeper;

    #[tokio::test]
    async fn test_first_throttle_does_not_wait() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut limiter = RateLimiter::new(Duration::from_millis(300), sleeper.clone());

        limiter.throttle().await;
        assert!(sleeper.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_waits_between_successive_items() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut limiter = RateLimiter::new(Duration::from_millis(300), sleeper.clone());

        for _ in 0..4 {
            limiter.throttle().await;
        }

        assert_eq!(sleeper.pauses(), vec![Duration::from_millis(300); 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_waits() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(2)).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
