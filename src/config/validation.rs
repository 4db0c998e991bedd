//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTLs > 0, probabilities within 0..=1)
//! - Check cross-field consistency (quota weight fits the hourly budget)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{LockFailurePolicy, ServiceConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(url) = &config.store.url {
        let supported = ["redis://", "rediss://", "unix://", "redis+unix://"];
        if !supported.iter().any(|scheme| url.starts_with(scheme)) {
            errors.push(ValidationError::new(
                "store.url",
                format!("unsupported scheme in '{}'", url),
            ));
        }
    }
    if config.store.command_timeout_ms == 0 {
        errors.push(ValidationError::new("store.command_timeout_ms", "must be > 0"));
    }
    if config.store.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("store.connect_timeout_ms", "must be > 0"));
    }

    if config.cache.default_ttl_secs == 0 {
        errors.push(ValidationError::new("cache.default_ttl_secs", "must be > 0"));
    }
    if config.cache.max_local_entries == 0 {
        errors.push(ValidationError::new("cache.max_local_entries", "must be > 0"));
    }
    if !(0.0..=1.0).contains(&config.cache.sweep_probability) {
        errors.push(ValidationError::new(
            "cache.sweep_probability",
            "must be within 0.0..=1.0",
        ));
    }

    if config.lock.ttl_secs == 0 {
        errors.push(ValidationError::new("lock.ttl_secs", "must be > 0"));
    }
    if config.lock.key_prefix.is_empty() {
        errors.push(ValidationError::new("lock.key_prefix", "must not be empty"));
    }
    if config.lock.on_store_failure == LockFailurePolicy::Retry && config.lock.retry_attempts == 0 {
        errors.push(ValidationError::new(
            "lock.retry_attempts",
            "must be > 0 when on_store_failure = \"retry\"",
        ));
    }
    if config.lock.retry_base_delay_ms > config.lock.retry_max_delay_ms {
        errors.push(ValidationError::new(
            "lock.retry_base_delay_ms",
            "must not exceed lock.retry_max_delay_ms",
        ));
    }

    if config.rate_limit.interval_secs == 0 {
        errors.push(ValidationError::new("rate_limit.interval_secs", "must be > 0"));
    }
    if config.rate_limit.max_tokens == 0 {
        errors.push(ValidationError::new("rate_limit.max_tokens", "must be > 0"));
    }
    if config.rate_limit.default_limit == 0 {
        errors.push(ValidationError::new("rate_limit.default_limit", "must be > 0"));
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::new("rate_limit.sweep_interval_secs", "must be > 0"));
    }

    if config.quota.request_weight == 0 {
        errors.push(ValidationError::new("quota.request_weight", "must be > 0"));
    }
    if config.quota.request_weight > config.quota.hourly_limit {
        errors.push(ValidationError::new(
            "quota.request_weight",
            "must not exceed quota.hourly_limit",
        ));
    }
    if config.quota.hourly_limit > config.quota.daily_limit {
        errors.push(ValidationError::new(
            "quota.hourly_limit",
            "must not exceed quota.daily_limit",
        ));
    }

    if config.sliding_window.max_calls == 0 {
        errors.push(ValidationError::new("sliding_window.max_calls", "must be > 0"));
    }
    if config.sliding_window.window_secs == 0 {
        errors.push(ValidationError::new("sliding_window.window_secs", "must be > 0"));
    }

    if config.health.monitor_enabled && config.health.monitor_interval_secs == 0 {
        errors.push(ValidationError::new("health.monitor_interval_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty"));
        }
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new("admin.bind_address", "must be a socket address"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
