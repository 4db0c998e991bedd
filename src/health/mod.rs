//! Store health subsystem.
//!
//! # Data Flow
//! ```text
//! On demand (cache/lock call, admin /health):
//!     → ConnectionManager::check_health (throttled to min_interval)
//!     → Update state.rs
//!
//! Background (monitor.rs):
//!     Periodic timer
//!     → ConnectionManager::check_health
//! ```
//!
//! # Design Decisions
//! - Probes are throttled to bound load on the store
//! - A failed probe is data (`connected = false`), never an error
//! - Status transitions logged for observability

pub mod monitor;
pub mod state;

pub use monitor::HealthMonitor;
pub use state::ConnectionStatus;
