//! Health check domain types.
//!
//! # Data Flow
//! ```text
//! watch source
//!     → CheckObservation (node, check id, status, output, metadata)
//!     → CheckKey (composite key → storage key / lock key)
//!     → PersistedCheckState (what the store remembers per key)
//! ```
//!
//! # Design Decisions
//! - Status is a closed enum with an escape hatch for unknown states
//! - Keys are derived in exactly one place so store and lock never disagree
//! - Observations are immutable once received

pub mod ignore;
pub mod key;
pub mod types;

pub use ignore::IgnoreList;
pub use key::CheckKey;
pub use types::{CheckObservation, CheckStatus, PersistedCheckState};
