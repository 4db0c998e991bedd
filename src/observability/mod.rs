//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Cache, lock, limiters, connection manager produce:
//!     → logging.rs (structured log events, bounded warnings)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap (atomic increments)
//! - Store outages log a bounded number of warnings per process

pub mod logging;
pub mod metrics;
