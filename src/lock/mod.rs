//! Job idempotency lock.
//!
//! # Data Flow
//! ```text
//! Job submission (user_id, domain, job_id)
//!     → domain.rs (normalize domain, validate, build key)
//!     → job_lock.rs
//!         → SET key job_id NX EX ttl   (acquire)
//!         → GET key                    (owner on contention)
//!         → compare-and-delete script  (release)
//!     → store failure: fail_open | retry | fail_closed
//! ```
//!
//! # Design Decisions
//! - The lock value is the owning job id, so release can verify ownership
//! - Every lock has a TTL; a crashed worker never blocks forever
//! - Lock state lives in the shared store only, never in the local map

pub mod domain;
pub mod job_lock;
pub mod types;

pub use domain::{lock_key, normalize_domain};
pub use job_lock::JobLock;
pub use types::{AcquireOutcome, LockError, LockStatus};
