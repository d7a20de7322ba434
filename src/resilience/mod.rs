//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Lock contention / failed watch query:
//!     → backoff.rs (exponential delay with jitter)
//!     → retry until deadline or shutdown
//! ```
//!
//! # Design Decisions
//! - Jittered backoff prevents thundering herd across notif instances
//! - Reconciliation itself is never retried; the watch re-delivers state

pub mod backoff;

pub use backoff::{calculate_backoff, Backoff};
