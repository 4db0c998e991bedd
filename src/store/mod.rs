//! External key-value store subsystem.
//!
//! # Data Flow
//! ```text
//! Cache / JobLock
//!     → connection.rs (shared handle, throttled health)
//!     → client.rs (KvStore trait)
//!         → redis_store.rs (Redis, Lua compare-and-delete)
//!         → memory.rs (in-process, tests and single-node dev)
//! ```
//!
//! # Design Decisions
//! - One client per process, created at the composition root
//! - Atomic set-if-absent and compare-and-delete live behind the trait
//! - Every round-trip has a deadline

pub mod client;
pub mod connection;
pub mod memory;
pub mod redis_store;
pub mod types;

pub use client::KvStore;
pub use connection::ConnectionManager;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use types::{StoreError, StoreResult};
