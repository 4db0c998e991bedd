//! Dual-window quota for a scarce upstream API budget.
//!
//! A request is admitted only when both the hourly and the daily bucket can
//! absorb its weight. Admission charges both.

use std::sync::{Mutex, PoisonError};

use crate::config::QuotaConfig;
use crate::observability::metrics;
use crate::rate_limit::types::{current_time_ms, QuotaStatus, RateLimitExceeded, WindowStatus};
use crate::rate_limit::window::WindowCounter;

const HOUR_MS: u64 = 60 * 60 * 1000;
const DAY_MS: u64 = 24 * HOUR_MS;

#[derive(Debug)]
pub struct QuotaLimiter {
    hourly: WindowCounter,
    daily: WindowCounter,
    hourly_limit: u32,
    daily_limit: u32,
    weight: u32,
    /// Check-then-charge must not interleave across callers.
    admission: Mutex<()>,
}

impl QuotaLimiter {
    pub fn new(config: &QuotaConfig, max_tokens: usize) -> Self {
        Self {
            hourly: WindowCounter::new(HOUR_MS, max_tokens),
            daily: WindowCounter::new(DAY_MS, max_tokens),
            hourly_limit: config.hourly_limit,
            daily_limit: config.daily_limit,
            weight: config.request_weight,
            admission: Mutex::new(()),
        }
    }

    pub fn check(&self, token: &str) -> Result<QuotaStatus, RateLimitExceeded> {
        self.check_at(token, current_time_ms())
    }

    pub fn check_at(&self, token: &str, now_ms: u64) -> Result<QuotaStatus, RateLimitExceeded> {
        let _admission = self.admission.lock().unwrap_or_else(PoisonError::into_inner);

        let hourly_used = self.hourly.used(token, now_ms);
        let daily_used = self.daily.used(token, now_ms);
        let hourly_full = hourly_used.saturating_add(self.weight) > self.hourly_limit;
        let daily_full = daily_used.saturating_add(self.weight) > self.daily_limit;

        if hourly_full || daily_full {
            let reset_at_ms = self.hourly.reset_at(now_ms).max(self.daily.reset_at(now_ms));
            let limit = if daily_full { self.daily_limit } else { self.hourly_limit };
            tracing::info!(
                token,
                hourly_used,
                daily_used,
                hourly_limit = self.hourly_limit,
                daily_limit = self.daily_limit,
                "Quota exhausted"
            );
            metrics::record_rate_limited("quota");
            return Err(RateLimitExceeded::new(limit, reset_at_ms, now_ms));
        }

        // A token evicted from one window loses its bucket in the other too,
        // so it never regains daily budget while keeping its hourly count.
        let (_, evicted_hourly) = self.hourly.charge(token, self.weight, now_ms);
        let (_, evicted_daily) = self.daily.charge(token, self.weight, now_ms);
        if let Some(evicted) = evicted_hourly {
            self.daily.forget_token(&evicted);
        }
        if let Some(evicted) = evicted_daily {
            self.hourly.forget_token(&evicted);
        }
        Ok(self.status_at(token, now_ms))
    }

    pub fn status(&self, token: &str) -> QuotaStatus {
        self.status_at(token, current_time_ms())
    }

    pub fn status_at(&self, token: &str, now_ms: u64) -> QuotaStatus {
        QuotaStatus {
            hourly: WindowStatus::new(
                self.hourly_limit,
                self.hourly.used(token, now_ms),
                self.hourly.reset_at(now_ms),
            ),
            daily: WindowStatus::new(
                self.daily_limit,
                self.daily.used(token, now_ms),
                self.daily.reset_at(now_ms),
            ),
            request_weight: self.weight,
        }
    }

    pub fn sweep_at(&self, now_ms: u64) -> usize {
        self.hourly.sweep(now_ms) + self.daily.sweep(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota(hourly: u32, daily: u32) -> QuotaLimiter {
        let config = QuotaConfig {
            hourly_limit: hourly,
            daily_limit: daily,
            request_weight: 2,
        };
        QuotaLimiter::new(&config, 100)
    }

    #[test]
    fn test_weight_charges_both_windows() {
        let limiter = quota(10, 100);
        let status = limiter.check_at("key", 0).unwrap();
        assert_eq!(status.hourly.used, 2);
        assert_eq!(status.daily.used, 2);
    }

    #[test]
    fn test_hourly_exhaustion_reports_later_reset() {
        let limiter = quota(4, 100);
        limiter.check_at("key", 0).unwrap();
        limiter.check_at("key", 1).unwrap();

        let err = limiter.check_at("key", 2).unwrap_err();
        assert_eq!(err.limit, 4);
        assert_eq!(err.reset_at_ms, DAY_MS);
        // Denied calls are not charged.
        assert_eq!(limiter.status_at("key", 3).hourly.used, 4);

        // A new hour frees the hourly budget; the day keeps counting.
        let status = limiter.check_at("key", HOUR_MS).unwrap();
        assert_eq!(status.hourly.used, 2);
        assert_eq!(status.daily.used, 6);
    }

    #[test]
    fn test_daily_budget_blocks_across_hours() {
        let limiter = quota(10, 4);
        limiter.check_at("key", 0).unwrap();
        limiter.check_at("key", HOUR_MS).unwrap();

        let err = limiter.check_at("key", 2 * HOUR_MS).unwrap_err();
        assert_eq!(err.limit, 4);
        assert_eq!(err.reset_at_ms, DAY_MS);
    }

    #[test]
    fn test_eviction_drops_both_windows_together() {
        let config = QuotaConfig {
            hourly_limit: 10,
            daily_limit: 100,
            request_weight: 2,
        };
        let limiter = QuotaLimiter::new(&config, 2);
        limiter.check_at("a", 0).unwrap();
        limiter.check_at("b", 0).unwrap();

        // A new hour frees the hourly buckets but the daily ones stay live.
        limiter.check_at("c", HOUR_MS).unwrap();
        limiter.check_at("d", HOUR_MS).unwrap();
        limiter.check_at("e", HOUR_MS).unwrap();

        for token in ["c", "d", "e"] {
            let status = limiter.status_at(token, HOUR_MS);
            assert_eq!(status.hourly.used == 0, status.daily.used == 0, "token {}", token);
        }
    }

    #[test]
    fn test_sweep_drops_finished_windows() {
        let limiter = quota(10, 100);
        limiter.check_at("key", 0).unwrap();
        assert_eq!(limiter.sweep_at(HOUR_MS), 1);
        assert_eq!(limiter.sweep_at(DAY_MS), 1);
    }
}
