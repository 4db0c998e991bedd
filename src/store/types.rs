//! Store error definitions.

use thiserror::Error;

/// Errors that can occur talking to the external key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected or failed a command.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A round-trip exceeded its deadline.
    #[error("Store operation '{op}' timed out after {timeout_ms} ms")]
    Timeout { op: &'static str, timeout_ms: u64 },

    /// No connection could be established.
    #[error("Store not connected: {0}")]
    NotConnected(String),

    /// The store returned a reply the caller could not interpret.
    #[error("Unexpected store reply: {0}")]
    UnexpectedReply(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
