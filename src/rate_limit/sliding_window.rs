//! Sliding-window limiter over a per-client call log.

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;

use crate::config::SlidingWindowConfig;
use crate::observability::metrics;
use crate::rate_limit::types::current_time_ms;

/// Admits at most `max_calls` per client within any trailing `window`.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_calls: u32,
    window_ms: u64,
    calls: DashMap<String, VecDeque<u64>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls,
            window_ms: window.as_millis() as u64,
            calls: DashMap::new(),
        }
    }

    pub fn from_config(config: &SlidingWindowConfig) -> Self {
        Self::new(config.max_calls, Duration::from_secs(config.window_secs))
    }

    pub fn is_allowed(&self, client_id: &str) -> bool {
        self.is_allowed_at(client_id, current_time_ms())
    }

    pub fn is_allowed_at(&self, client_id: &str, now_ms: u64) -> bool {
        let mut log = self.calls.entry(client_id.to_string()).or_default();
        self.forget_old(&mut log, now_ms);

        if log.len() < self.max_calls as usize {
            log.push_back(now_ms);
            true
        } else {
            tracing::debug!(client_id, max_calls = self.max_calls, "Sliding window full");
            metrics::record_rate_limited("sliding_window");
            false
        }
    }

    /// Calls still counted against `client_id`.
    pub fn usage_at(&self, client_id: &str, now_ms: u64) -> u32 {
        self.calls.get(client_id).map_or(0, |log| {
            log.iter()
                .filter(|&&at| now_ms.saturating_sub(at) < self.window_ms)
                .count() as u32
        })
    }

    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let before = self.calls.len();
        self.calls.retain(|_, log| {
            self.forget_old(log, now_ms);
            !log.is_empty()
        });
        before.saturating_sub(self.calls.len())
    }

    /// A call counts while `now - at < window`.
    fn forget_old(&self, log: &mut VecDeque<u64>, now_ms: u64) {
        while log
            .front()
            .is_some_and(|&at| now_ms.saturating_sub(at) >= self.window_ms)
        {
            log.pop_front();
        }
    }
}
