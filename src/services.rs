//! Composition root.
//!
//! Builds every shared component once from configuration and hands out
//! `Arc` handles. Nothing in the crate reaches for a global.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResilientCache;
use crate::config::ServiceConfig;
use crate::health::HealthMonitor;
use crate::lock::JobLock;
use crate::rate_limit::{
    FixedWindowLimiter, HttpRateLimit, QuotaLimiter, RateLimitSweeper, SlidingWindowLimiter,
    Sweepable,
};
use crate::store::ConnectionManager;

pub struct Services {
    pub config: ServiceConfig,
    pub connection: Arc<ConnectionManager>,
    pub cache: Arc<ResilientCache>,
    pub job_lock: Arc<JobLock>,
    /// Generic per-token limiter for application callers.
    pub api_limiter: Arc<FixedWindowLimiter>,
    /// Per-IP limiter guarding the admin API.
    pub admin_limiter: Arc<FixedWindowLimiter>,
    pub quota: Arc<QuotaLimiter>,
    pub sliding_window: Arc<SlidingWindowLimiter>,
}

impl Services {
    pub fn from_config(config: ServiceConfig) -> Self {
        let connection = Arc::new(ConnectionManager::from_config(&config.store, &config.health));
        Self::with_connection(config, connection)
    }

    /// Build around an existing connection manager, e.g. one wrapping a
    /// `MemoryStore`.
    pub fn with_connection(config: ServiceConfig, connection: Arc<ConnectionManager>) -> Self {
        let cache = Arc::new(ResilientCache::new(connection.clone(), &config.cache));
        let job_lock = Arc::new(JobLock::new(connection.clone(), &config.lock));

        tracing::info!(
            store_configured = connection.is_configured(),
            lock_ttl_secs = config.lock.ttl_secs,
            lock_policy = ?config.lock.on_store_failure,
            rate_limit_enabled = config.rate_limit.enabled,
            "Services initialized"
        );

        Self {
            api_limiter: Arc::new(FixedWindowLimiter::from_config("api", &config.rate_limit)),
            admin_limiter: Arc::new(FixedWindowLimiter::from_config("admin", &config.rate_limit)),
            quota: Arc::new(QuotaLimiter::new(&config.quota, config.rate_limit.max_tokens)),
            sliding_window: Arc::new(SlidingWindowLimiter::from_config(&config.sliding_window)),
            config,
            connection,
            cache,
            job_lock,
        }
    }

    pub fn health_monitor(&self) -> HealthMonitor {
        HealthMonitor::new(self.connection.clone(), self.config.health.clone())
    }

    pub fn rate_limit_sweeper(&self) -> RateLimitSweeper {
        let limiters: Vec<Arc<dyn Sweepable>> = vec![
            self.api_limiter.clone(),
            self.admin_limiter.clone(),
            self.quota.clone(),
            self.sliding_window.clone(),
        ];
        RateLimitSweeper::new(
            limiters,
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
        )
    }

    pub fn admin_rate_limit(&self) -> HttpRateLimit {
        HttpRateLimit {
            limiter: self.admin_limiter.clone(),
            requests_per_interval: self.config.rate_limit.admin_requests_per_interval,
            enabled: self.config.rate_limit.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config_is_memory_only() {
        let services = Services::from_config(ServiceConfig::default());
        assert!(!services.connection.is_configured());

        assert!(services.cache.set("k", &1u32, None).await);
        assert_eq!(services.cache.get::<u32>("k").await, Some(1));
    }
}
