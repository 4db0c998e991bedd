//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, REDIS_URL override)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to Services::from_config at the composition root
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; no store URL means memory-only mode
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    AdminConfig, CacheConfig, HealthConfig, LockConfig, LockFailurePolicy, LogFormat,
    ObservabilityConfig, QuotaConfig, RateLimitConfig, ServiceConfig, SlidingWindowConfig,
    StoreConfig,
};
