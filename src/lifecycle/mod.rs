//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Config → Logging → Metrics → Store (probe) → Processor → Workers → Watcher
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Watcher stops → Workers finish current observation → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Per-observation errors never stop the process

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
