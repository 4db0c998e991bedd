//! Store-first cache with local fallback.
//!
//! # Read path
//! ```text
//! get(key)
//!     → store connected? read from store → decode → hit
//!     → store miss / error / disconnected → local map → hit or miss
//! ```
//!
//! # Write path
//! ```text
//! set(key, value, ttl)
//!     → store connected? SETEX → drop stale local copy → true
//!     → otherwise local map (+ occasional expiry sweep) → true
//! ```

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;

use crate::cache::local::LocalCache;
use crate::cache::stats::{CacheStats, MetricsSnapshot};
use crate::config::CacheConfig;
use crate::observability::logging::LogBudget;
use crate::observability::metrics;
use crate::store::{ConnectionManager, KvStore};

/// Cache that degrades from the external store to process memory.
pub struct ResilientCache {
    connection: Arc<ConnectionManager>,
    local: LocalCache,
    stats: CacheStats,
    error_log: LogBudget,
    default_ttl: Duration,
    sweep_probability: f64,
}

impl ResilientCache {
    pub fn new(connection: Arc<ConnectionManager>, config: &CacheConfig) -> Self {
        Self {
            connection,
            local: LocalCache::new(config.max_local_entries),
            stats: CacheStats::new(),
            error_log: LogBudget::new(config.max_logged_errors),
            default_ttl: Duration::from_secs(config.default_ttl_secs),
            sweep_probability: config.sweep_probability,
        }
    }

    /// Look up and decode `key`. `None` on miss, expiry or undecodable data.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let started = Instant::now();
        self.stats.record_request();

        let found = self.lookup(key).await;

        let elapsed = started.elapsed();
        self.stats.record_response_time(elapsed.as_secs_f64() * 1000.0);
        match &found {
            Some((_, source)) => {
                self.stats.record_hit();
                metrics::record_cache_lookup("hit", *source, elapsed);
            }
            None => {
                self.stats.record_miss();
                metrics::record_cache_lookup("miss", "none", elapsed);
            }
        }
        found.map(|(value, _)| value)
    }

    /// Store `value` for `ttl` (or the configured default). Returns false only
    /// when the value cannot be serialized.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.stats.record_error();
                metrics::record_cache_error("encode");
                tracing::warn!(key = %key, error = %e, "Cache value is not serializable");
                return false;
            }
        };

        if let Some(client) = self.connected_store().await {
            match client.set_ex(key, &raw, whole_seconds(ttl)).await {
                Ok(()) => {
                    self.local.remove(key);
                    return true;
                }
                Err(e) => self.record_failure("set", key, &e),
            }
        }

        self.local.insert(key, raw, ttl);
        if self.sweep_probability > 0.0 && fastrand::f64() < self.sweep_probability {
            let swept = self.sweep_local();
            if swept > 0 {
                tracing::debug!(swept, remaining = self.local.len(), "Swept expired local cache entries");
            }
        } else {
            metrics::record_local_entries(self.local.len());
        }
        true
    }

    /// Delete from both backends. True if either deletion succeeded.
    pub async fn del(&self, key: &str) -> bool {
        let mut store_ok = false;
        if let Some(client) = self.connected_store().await {
            match client.del(key).await {
                Ok(_) => store_ok = true,
                Err(e) => self.record_failure("del", key, &e),
            }
        }
        let local_ok = self.local.remove(key);
        store_ok || local_ok
    }

    /// Counters, hit rate and current mode.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.stats.snapshot(self.connection.is_connected(), self.local.len())
    }

    /// Drop every expired local entry.
    pub fn sweep_local(&self) -> usize {
        let swept = self.local.sweep_expired();
        metrics::record_local_entries(self.local.len());
        swept
    }

    /// Drop every local entry. Returns how many were held.
    pub fn clear_local(&self) -> usize {
        let cleared = self.local.clear();
        metrics::record_local_entries(0);
        tracing::info!(cleared, "Local cache cleared");
        cleared
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<(T, &'static str)> {
        if let Some(client) = self.connected_store().await {
            match client.get(key).await {
                Ok(Some(raw)) => match serde_json::from_str(&raw) {
                    Ok(value) => return Some((value, "store")),
                    Err(e) => self.record_failure("decode", key, &e),
                },
                Ok(None) => {}
                Err(e) => self.record_failure("get", key, &e),
            }
        }

        let raw = self.local.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some((value, "local")),
            Err(e) => {
                self.record_failure("decode", key, &e);
                self.local.remove(key);
                None
            }
        }
    }

    async fn connected_store(&self) -> Option<Arc<dyn KvStore>> {
        let client = self.connection.get_client()?;
        if self.connection.check_health().await.connected {
            Some(client)
        } else {
            None
        }
    }

    fn record_failure(&self, op: &'static str, key: &str, error: &dyn Display) {
        self.stats.record_error();
        metrics::record_cache_error(op);
        if self.error_log.allow() {
            tracing::warn!(op, key = %key, error = %error, "Cache store operation failed, using local fallback");
        } else {
            tracing::debug!(op, key = %key, error = %error, "Cache store operation failed");
        }
    }
}

/// SETEX takes whole seconds; round up and never send zero.
fn whole_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}
