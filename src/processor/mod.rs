//! Reconciliation engine.
//!
//! # Data Flow
//! ```text
//! mpsc<CheckObservation>
//!     → pool.rs (shard by check key, one worker per shard)
//!     → engine.rs (ignore → lock → memo/store lookup → notify → persist → unlock)
//!         → memo.rs (per-instance last known state)
//!         → alert.rs (description, link, details)
//! ```
//!
//! # Design Decisions
//! - At most one notification per genuine transition per key
//! - A failed notification is never recorded, so the next delivery retries it
//! - Errors are scoped to one observation and never stop the loop

pub mod alert;
pub mod engine;
pub mod error;
pub mod memo;
pub mod pool;

pub use alert::AlertFormatter;
pub use engine::{Outcome, Processor};
pub use error::ProcessError;
pub use memo::MemoCache;
pub use pool::{shard_for, spawn_workers};
