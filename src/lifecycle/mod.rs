//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! SIGINT / SIGTERM (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → health monitor, rate limit sweeper, admin server stop
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; every background task owns a receiver
//! - The admin server drains in-flight requests before exit
//! - Background task panics are logged on join, never swallowed

pub mod shutdown;
pub mod signals;

pub use shutdown::{join_tasks, Shutdown};
pub use signals::wait_for_signal;
