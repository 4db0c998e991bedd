//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Job lock acquire under the `retry` store-failure policy:
//!     → attempt store operation
//!     → On failure: backoff.rs (exponential delay + jitter)
//!     → retry until attempts are exhausted, then deny
//! ```
//!
//! # Design Decisions
//! - Jittered backoff prevents thundering herd against a recovering store
//! - Retries are bounded; the caller always gets an answer

pub mod backoff;

pub use backoff::Backoff;
