//! Generic fixed-window limiter.

use std::time::Duration;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::rate_limit::types::{current_time_ms, RateLimitExceeded, WindowStatus};
use crate::rate_limit::window::WindowCounter;

/// Counts calls per token in fixed windows of `interval`.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    name: &'static str,
    counter: WindowCounter,
}

impl FixedWindowLimiter {
    pub fn new(name: &'static str, interval: Duration, max_tokens: usize) -> Self {
        Self {
            name,
            counter: WindowCounter::new(interval.as_millis() as u64, max_tokens),
        }
    }

    pub fn from_config(name: &'static str, config: &RateLimitConfig) -> Self {
        Self::new(name, Duration::from_secs(config.interval_secs), config.max_tokens)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Count one call for `token`; fails once the window holds more than
    /// `limit` calls.
    pub fn check(&self, limit: u32, token: &str) -> Result<WindowStatus, RateLimitExceeded> {
        self.check_at(limit, token, current_time_ms())
    }

    pub fn check_at(
        &self,
        limit: u32,
        token: &str,
        now_ms: u64,
    ) -> Result<WindowStatus, RateLimitExceeded> {
        let used = self.counter.add(token, 1, now_ms);
        let reset_at_ms = self.counter.reset_at(now_ms);

        if used > limit {
            tracing::debug!(limiter = self.name, token, used, limit, "Rate limit exceeded");
            metrics::record_rate_limited(self.name);
            return Err(RateLimitExceeded::new(limit, reset_at_ms, now_ms));
        }
        Ok(WindowStatus::new(limit, used, reset_at_ms))
    }

    pub fn status(&self, limit: u32, token: &str) -> WindowStatus {
        self.status_at(limit, token, current_time_ms())
    }

    pub fn status_at(&self, limit: u32, token: &str, now_ms: u64) -> WindowStatus {
        WindowStatus::new(limit, self.counter.used(token, now_ms), self.counter.reset_at(now_ms))
    }

    pub fn sweep_at(&self, now_ms: u64) -> usize {
        self.counter.sweep(now_ms)
    }

    pub fn tracked_buckets(&self) -> usize {
        self.counter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_plus_one_fails_until_rollover() {
        let limiter = FixedWindowLimiter::new("test", Duration::from_secs(60), 100);
        let start = 120_000;

        for i in 1..=3 {
            let status = limiter.check_at(3, "tok", start + i).unwrap();
            assert_eq!(status.used, i as u32);
        }

        let err = limiter.check_at(3, "tok", start + 10).unwrap_err();
        assert_eq!(err.limit, 3);
        assert_eq!(err.reset_at_ms, 180_000);

        // Next window starts fresh.
        let status = limiter.check_at(3, "tok", 180_000).unwrap();
        assert_eq!(status.used, 1);
        assert_eq!(status.remaining, 2);
    }

    #[test]
    fn test_status_does_not_count() {
        let limiter = FixedWindowLimiter::new("test", Duration::from_secs(60), 100);
        limiter.check_at(5, "tok", 1_000).unwrap();

        let status = limiter.status_at(5, "tok", 2_000);
        assert_eq!(status.used, 1);
        assert_eq!(limiter.status_at(5, "tok", 2_000), status);
        assert_eq!(limiter.status_at(5, "other", 2_000).remaining, 5);
    }

    #[test]
    fn test_tokens_are_independent() {
        let limiter = FixedWindowLimiter::new("test", Duration::from_secs(60), 100);
        limiter.check_at(1, "a", 0).unwrap();
        assert!(limiter.check_at(1, "a", 1).is_err());
        assert!(limiter.check_at(1, "b", 1).is_ok());
    }
}
