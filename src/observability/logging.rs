//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Cap repetitive warnings so an outage does not flood the logs
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level

use std::sync::atomic::{AtomicU32, Ordering};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("resilience_layer={},tower_http=info", config.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Counts occurrences of a noisy event and tells the caller whether this one
/// still fits in the per-process budget.
#[derive(Debug)]
pub struct LogBudget {
    limit: u32,
    seen: AtomicU32,
}

impl LogBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            seen: AtomicU32::new(0),
        }
    }

    /// Record one occurrence. Returns true while the budget lasts.
    pub fn allow(&self) -> bool {
        self.seen.fetch_add(1, Ordering::Relaxed) < self.limit
    }

    /// Total occurrences recorded, including suppressed ones.
    pub fn seen(&self) -> u32 {
        self.seen.load(Ordering::Relaxed)
    }
}
