//! Resilience layer: store-backed caching with in-memory fallback, a job
//! idempotency lock and rate limiting over one shared connection.

pub mod admin;
pub mod cache;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod lock;
pub mod observability;
pub mod rate_limit;
pub mod resilience;
pub mod services;
pub mod store;

pub use cache::ResilientCache;
pub use config::ServiceConfig;
pub use lifecycle::Shutdown;
pub use lock::JobLock;
pub use services::Services;
