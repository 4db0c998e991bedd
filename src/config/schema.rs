//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! resilience layer. All types derive Serde traits for deserialization from
//! config files, and every section falls back to defaults so an empty file
//! (or no file at all) yields a memory-only deployment.

use serde::{Deserialize, Serialize};

/// Root configuration for the resilience layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// External key-value store connection.
    pub store: StoreConfig,

    /// Resilient cache settings.
    pub cache: CacheConfig,

    /// Job idempotency lock settings.
    pub lock: LockConfig,

    /// Generic fixed-window rate limiter settings.
    pub rate_limit: RateLimitConfig,

    /// Dual-window (hourly + daily) quota for scarce external APIs.
    pub quota: QuotaConfig,

    /// Sliding-window call log limiter.
    pub sliding_window: SlidingWindowConfig,

    /// Connection health checking.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Operator admin API.
    pub admin: AdminConfig,
}

/// External store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection string (e.g., "redis://127.0.0.1:6379/").
    /// `None` runs the layer in memory-only mode.
    pub url: Option<String>,

    /// Deadline for a single store round-trip in milliseconds.
    pub command_timeout_ms: u64,

    /// Deadline for establishing the connection in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            command_timeout_ms: 500,
            connect_timeout_ms: 2000,
        }
    }
}

/// Resilient cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when callers do not pass one, in seconds.
    pub default_ttl_secs: u64,

    /// Upper bound on entries held by the local fallback map.
    pub max_local_entries: usize,

    /// Probability (0.0..=1.0) that a local write triggers a full expiry sweep.
    pub sweep_probability: f64,

    /// Number of store errors logged at warn level per process.
    pub max_logged_errors: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 3600,
            max_local_entries: 10_000,
            sweep_probability: 0.1,
            max_logged_errors: 3,
        }
    }
}

/// What the job lock does when the store cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockFailurePolicy {
    /// Grant the lock (availability over strict idempotency).
    #[default]
    FailOpen,
    /// Retry with backoff, then deny.
    Retry,
    /// Deny immediately.
    FailClosed,
}

/// Job idempotency lock configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockConfig {
    /// Lifetime of a lock record in seconds; bounds how long a crashed
    /// holder can block a retry.
    pub ttl_secs: u64,

    /// Namespace prefix for lock keys.
    pub key_prefix: String,

    /// Behaviour when the store errors or is unreachable.
    pub on_store_failure: LockFailurePolicy,

    /// Attempts made under the `retry` policy.
    pub retry_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub retry_max_delay_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            key_prefix: "lock".to_string(),
            on_store_failure: LockFailurePolicy::FailOpen,
            retry_attempts: 3,
            retry_base_delay_ms: 100,
            retry_max_delay_ms: 2000,
        }
    }
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting on the admin API.
    pub enabled: bool,

    /// Window length in seconds.
    pub interval_secs: u64,

    /// Maximum distinct tokens tracked per window.
    pub max_tokens: usize,

    /// Calls per window for application tokens on the generic limiter.
    pub default_limit: u32,

    /// Requests per window allowed for each admin API client.
    pub admin_requests_per_interval: u32,

    /// How often stale buckets are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            max_tokens: 500,
            default_limit: 100,
            admin_requests_per_interval: 120,
            sweep_interval_secs: 300,
        }
    }
}

/// Dual-window quota configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Units admitted per hour.
    pub hourly_limit: u32,

    /// Units admitted per day.
    pub daily_limit: u32,

    /// Units consumed by one admitted request (e.g., 2 sub-requests).
    pub request_weight: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            hourly_limit: 100,
            daily_limit: 1000,
            request_weight: 2,
        }
    }
}

/// Sliding-window limiter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SlidingWindowConfig {
    /// Calls allowed within the trailing window.
    pub max_calls: u32,

    /// Trailing window length in seconds.
    pub window_secs: u64,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self {
            max_calls: 1000,
            window_secs: 3600,
        }
    }
}

/// Connection health configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Minimum seconds between two store probes.
    pub min_interval_secs: u64,

    /// Run the background health monitor.
    pub monitor_enabled: bool,

    /// Background monitor tick in seconds.
    pub monitor_interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 30,
            monitor_enabled: true,
            monitor_interval_secs: 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
