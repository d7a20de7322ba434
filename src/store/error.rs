//! Store error definitions.

use thiserror::Error;

/// Errors that can occur talking to the state store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request never produced a response.
    #[error("store transport error: {0}")]
    Transport(String),

    /// Store answered with an unexpected HTTP status.
    #[error("store returned status {status} for '{key}'")]
    Status { key: String, status: u16 },

    /// Stored value could not be decoded.
    #[error("undecodable value at '{key}': {reason}")]
    Decode { key: String, reason: String },

    /// Value could not be encoded for writing.
    #[error("failed to encode value for '{key}': {reason}")]
    Encode { key: String, reason: String },

    /// Lock was not acquired before the deadline.
    #[error("timed out after {waited_ms}ms acquiring lock '{key}'")]
    LockTimeout { key: String, waited_ms: u64 },

    /// The store refused to hand out or keep the lock.
    #[error("lock '{key}' lost: {reason}")]
    LockLost { key: String, reason: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
