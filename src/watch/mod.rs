//! Observation sources.
//!
//! # Data Flow
//! ```text
//! Consul agent
//!     → consul.rs (blocking queries, full check list per index change)
//!     → mpsc<CheckObservation> (bounded; backpressure from the processor)
//! ```

pub mod consul;

use thiserror::Error;

pub use consul::ConsulWatcher;

/// Errors that end a watch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The processor dropped its receiver.
    #[error("observation channel closed")]
    ChannelClosed,
}
