//! Exponential backoff with jitter for store retries.

use std::time::Duration;

use rand::Rng;

use crate::config::LockConfig;

/// Retry schedule: `base * 2^(attempt-1)`, capped, plus up to 10% jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub max_attempts: u32,
    pub base_ms: u64,
    pub max_ms: u64,
}

impl Backoff {
    pub fn from_lock_config(config: &LockConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            base_ms: config.retry_base_delay_ms,
            max_ms: config.retry_max_delay_ms,
        }
    }

    /// Delay to wait before retry number `attempt` (1-based). Zero for the
    /// first try.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let factor = 2u64.saturating_pow(attempt - 1);
        let capped = self.base_ms.saturating_mul(factor).min(self.max_ms);

        let jitter_range = capped / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped + jitter)
    }
}
