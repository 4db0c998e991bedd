//! Cache hit/miss accounting and the metrics snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Weight of the newest sample in the response-time moving average.
const EMA_ALPHA: f64 = 0.2;

/// Where cached data currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Store connected, nothing held locally.
    Store,
    /// Store unavailable.
    Memory,
    /// Store connected while local entries from an earlier outage remain.
    Hybrid,
}

impl CacheMode {
    pub fn classify(store_connected: bool, local_empty: bool) -> Self {
        match (store_connected, local_empty) {
            (false, _) => CacheMode::Memory,
            (true, true) => CacheMode::Store,
            (true, false) => CacheMode::Hybrid,
        }
    }
}

/// Point-in-time view of the cache counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub total_requests: u64,
    pub hit_rate_pct: f64,
    pub avg_response_time_ms: f64,
    pub redis_connected: bool,
    pub mode: CacheMode,
    pub local_entries: usize,
}

/// Process-lifetime counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    total_requests: AtomicU64,
    avg_response_ms: Mutex<Option<f64>>,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold a sample into the exponential moving average.
    pub fn record_response_time(&self, millis: f64) {
        let mut avg = self.avg_response_ms.lock().unwrap_or_else(PoisonError::into_inner);
        *avg = Some(match *avg {
            None => millis,
            Some(prev) => EMA_ALPHA * millis + (1.0 - EMA_ALPHA) * prev,
        });
    }

    pub fn snapshot(&self, redis_connected: bool, local_entries: usize) -> MetricsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let hit_rate_pct = if total_requests == 0 {
            0.0
        } else {
            round2(hits as f64 / total_requests as f64 * 100.0)
        };
        let avg = self
            .avg_response_ms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or(0.0);

        MetricsSnapshot {
            hits,
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            total_requests,
            hit_rate_pct,
            avg_response_time_ms: round2(avg),
            redis_connected,
            mode: CacheMode::classify(redis_connected, local_entries == 0),
            local_entries,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
