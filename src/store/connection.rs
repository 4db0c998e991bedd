//! Shared store handle with a throttled health signal.
//!
//! # Responsibilities
//! - Own the single store client for the process
//! - Probe the store at most once per `min_interval`
//! - Publish a `ConnectionStatus` snapshot for routing decisions
//!
//! Nothing here returns an error: failures surface as `connected = false`.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{HealthConfig, StoreConfig};
use crate::health::state::ConnectionStatus;
use crate::observability::metrics;
use crate::store::client::KvStore;
use crate::store::redis_store::RedisStore;

/// Owns the store client and its health state.
pub struct ConnectionManager {
    client: Option<Arc<dyn KvStore>>,
    status: RwLock<ConnectionStatus>,
    last_probe: Mutex<Option<Instant>>,
    /// Serializes probes so concurrent callers share one round-trip.
    probe_gate: tokio::sync::Mutex<()>,
    min_interval: Duration,
}

impl ConnectionManager {
    /// Wrap an already-built client (or `None` for memory-only mode).
    pub fn new(client: Option<Arc<dyn KvStore>>, min_interval: Duration) -> Self {
        Self {
            client,
            status: RwLock::new(ConnectionStatus::default()),
            last_probe: Mutex::new(None),
            probe_gate: tokio::sync::Mutex::new(()),
            min_interval,
        }
    }

    /// A manager with no store; everything routes to memory.
    pub fn memory_only() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    /// Build from configuration. A missing or unparsable URL degrades to
    /// memory-only mode instead of failing startup.
    pub fn from_config(store: &StoreConfig, health: &HealthConfig) -> Self {
        let min_interval = Duration::from_secs(health.min_interval_secs);
        let Some(url) = store.url.as_deref() else {
            tracing::info!("No store URL configured, running in memory-only mode");
            return Self::new(None, min_interval);
        };

        match RedisStore::open(
            url,
            Duration::from_millis(store.command_timeout_ms),
            Duration::from_millis(store.connect_timeout_ms),
        ) {
            Ok(redis) => {
                tracing::info!(
                    command_timeout_ms = store.command_timeout_ms,
                    min_probe_interval_secs = health.min_interval_secs,
                    "Store client configured"
                );
                Self::new(Some(Arc::new(redis)), min_interval)
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid store URL, continuing in memory-only mode");
                Self::new(None, min_interval)
            }
        }
    }

    /// The shared client, if one was configured.
    pub fn get_client(&self) -> Option<Arc<dyn KvStore>> {
        self.client.clone()
    }

    /// Whether a store client exists at all.
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Cached connected flag from the last probe.
    pub fn is_connected(&self) -> bool {
        self.status.read().unwrap_or_else(PoisonError::into_inner).connected
    }

    /// Snapshot without probing.
    pub fn status(&self) -> ConnectionStatus {
        self.status.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Probe the store unless the last probe is recent enough.
    pub async fn check_health(&self) -> ConnectionStatus {
        let Some(client) = &self.client else {
            return self.status();
        };
        if self.probed_recently() {
            return self.status();
        }

        let _gate = self.probe_gate.lock().await;
        // Another caller may have finished a probe while we waited.
        if self.probed_recently() {
            return self.status();
        }

        let started = Instant::now();
        let was_connected = self.is_connected();
        let status = match client.ping().await {
            Ok(()) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                if !was_connected {
                    tracing::info!(
                        backend = client.backend_name(),
                        latency_ms,
                        "Store connection healthy"
                    );
                }
                ConnectionStatus::healthy(latency_ms)
            }
            Err(e) => {
                if was_connected {
                    tracing::warn!(backend = client.backend_name(), error = %e, "Store health check failed");
                } else {
                    tracing::debug!(backend = client.backend_name(), error = %e, "Store still unreachable");
                }
                ConnectionStatus::unhealthy()
            }
        };

        *self.last_probe.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status.clone();
        metrics::record_store_health(status.connected, status.latency_ms);
        status
    }

    fn probed_recently(&self) -> bool {
        self.last_probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|at| at.elapsed() < self.min_interval)
    }
}
