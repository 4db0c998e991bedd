//! Resilient caching subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler
//!     → resilient.rs (store first, local fallback)
//!         → store::ConnectionManager (health-gated store access)
//!         → local.rs (bounded TTL map, probabilistic sweep)
//!     → stats.rs (hits, misses, errors, latency EMA, mode)
//! key.rs builds short hashed keys for callers.
//! ```
//!
//! # Design Decisions
//! - Values are JSON-serialized; the store only sees strings
//! - The local map is per process and never authoritative across instances
//! - Store errors degrade the call, they never fail it

pub mod key;
pub mod local;
pub mod resilient;
pub mod stats;

pub use key::generate_cache_key;
pub use resilient::ResilientCache;
pub use stats::{CacheMode, MetricsSnapshot};
