//! Rate limiting subsystem.
//!
//! # Data Flow
//! ```text
//! Caller / HTTP request
//!     → middleware.rs (client IP → FixedWindowLimiter)
//!     → fixed_window.rs (one counter per token per window)
//!     → quota.rs (hourly + daily budget, weighted)
//!     → sliding_window.rs (trailing call log per client)
//!         → window.rs (buckets keyed `token:{floor(now/interval)}`)
//! sweeper.rs prunes finished windows every few minutes.
//! ```
//!
//! # Design Decisions
//! - Counters are process-local; each instance enforces its own budget
//! - Every limiter has a `*_at(now_ms)` form so tests control the clock
//! - Denials carry the reset time so callers can set `Retry-After`

pub mod fixed_window;
pub mod middleware;
pub mod quota;
pub mod sliding_window;
pub mod sweeper;
pub mod types;
mod window;

pub use fixed_window::FixedWindowLimiter;
pub use middleware::{rate_limit_middleware, HttpRateLimit};
pub use quota::QuotaLimiter;
pub use sliding_window::SlidingWindowLimiter;
pub use sweeper::{RateLimitSweeper, Sweepable};
pub use types::{current_time_ms, QuotaStatus, RateLimitExceeded, WindowStatus};
