//! Job lock outcomes and errors.

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the job lock. Contention is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Caller passed an unusable user, domain or job identifier.
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: &'static str },

    /// The store could not be reached and the policy forbids granting.
    #[error("Lock store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Result of an acquire attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquireOutcome {
    /// Whether the caller may proceed with the job.
    pub acquired: bool,
    /// Owner of the lock when `acquired` is false.
    pub existing_job_id: Option<String>,
    /// True when granted without the store (fail-open).
    pub degraded: bool,
}

impl AcquireOutcome {
    pub fn granted() -> Self {
        Self {
            acquired: true,
            existing_job_id: None,
            degraded: false,
        }
    }

    pub fn held_by(existing_job_id: Option<String>) -> Self {
        Self {
            acquired: false,
            existing_job_id,
            degraded: false,
        }
    }

    pub fn fail_open() -> Self {
        Self {
            acquired: true,
            existing_job_id: None,
            degraded: true,
        }
    }
}

/// Read-only view of a lock key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub locked: bool,
    pub job_id: Option<String>,
    pub ttl_remaining_secs: Option<u64>,
}

impl LockStatus {
    pub fn free() -> Self {
        Self {
            locked: false,
            job_id: None,
            ttl_remaining_secs: None,
        }
    }
}
