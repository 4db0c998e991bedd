//! Periodic cleanup of stale limiter state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::rate_limit::fixed_window::FixedWindowLimiter;
use crate::rate_limit::quota::QuotaLimiter;
use crate::rate_limit::sliding_window::SlidingWindowLimiter;
use crate::rate_limit::types::current_time_ms;

/// Limiter state that can be pruned.
pub trait Sweepable: Send + Sync {
    fn label(&self) -> &'static str;

    /// Remove state that no longer affects admission. Returns entries dropped.
    fn sweep_at(&self, now_ms: u64) -> usize;
}

impl Sweepable for FixedWindowLimiter {
    fn label(&self) -> &'static str {
        self.name()
    }

    fn sweep_at(&self, now_ms: u64) -> usize {
        FixedWindowLimiter::sweep_at(self, now_ms)
    }
}

impl Sweepable for QuotaLimiter {
    fn label(&self) -> &'static str {
        "quota"
    }

    fn sweep_at(&self, now_ms: u64) -> usize {
        QuotaLimiter::sweep_at(self, now_ms)
    }
}

impl Sweepable for SlidingWindowLimiter {
    fn label(&self) -> &'static str {
        "sliding_window"
    }

    fn sweep_at(&self, now_ms: u64) -> usize {
        SlidingWindowLimiter::sweep_at(self, now_ms)
    }
}

pub struct RateLimitSweeper {
    limiters: Vec<Arc<dyn Sweepable>>,
    interval: Duration,
}

impl RateLimitSweeper {
    pub fn new(limiters: Vec<Arc<dyn Sweepable>>, interval: Duration) -> Self {
        Self { limiters, interval }
    }

    /// Sweep every limiter once.
    pub fn sweep_all_at(&self, now_ms: u64) -> usize {
        self.limiters
            .iter()
            .map(|limiter| {
                let removed = limiter.sweep_at(now_ms);
                if removed > 0 {
                    tracing::debug!(limiter = limiter.label(), removed, "Swept stale rate limit state");
                }
                removed
            })
            .sum()
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            limiters = self.limiters.len(),
            "Rate limit sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; nothing to sweep yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_all_at(current_time_ms());
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
