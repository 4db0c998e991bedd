//! Store connection status.
//!
//! # States
//! - Connected: last probe succeeded; cache and lock route to the store
//! - Disconnected: never probed, not configured, or last probe failed
//!
//! Only the connection manager mutates this; everything else reads snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of the store connection as of the last probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ConnectionStatus {
    /// Whether the last probe succeeded.
    pub connected: bool,
    /// When the last probe ran. `None` until the first probe.
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Round-trip latency of the last successful probe.
    pub latency_ms: Option<u64>,
}

impl ConnectionStatus {
    /// Status after a successful probe.
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            connected: true,
            last_checked_at: Some(Utc::now()),
            latency_ms: Some(latency_ms),
        }
    }

    /// Status after a failed probe.
    pub fn unhealthy() -> Self {
        Self {
            connected: false,
            last_checked_at: Some(Utc::now()),
            latency_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let ok = ConnectionStatus::healthy(3);
        assert!(ok.connected);
        assert_eq!(ok.latency_ms, Some(3));

        let down = ConnectionStatus::unhealthy();
        assert!(!down.connected);
        assert!(down.last_checked_at.is_some());
        assert!(ConnectionStatus::default().last_checked_at.is_none());
    }
}
