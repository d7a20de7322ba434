//! Per-observation reconciliation errors.

use thiserror::Error;

use crate::notifier::NotifierError;
use crate::processor::engine::Outcome;
use crate::store::StoreError;

/// Why one observation was not fully reconciled.
///
/// None of these are fatal to the process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Lock could not be acquired; the observation was dropped.
    #[error("failed to acquire lock for '{key}': {source}")]
    Lock { key: String, source: StoreError },

    /// Prior state could not be read; nothing was sent or written.
    #[error("failed to read state for '{key}': {source}")]
    Read { key: String, source: StoreError },

    /// The backend call failed; state was neither persisted nor memoized.
    #[error("failed to {action} '{key}': {source}")]
    Dispatch {
        key: String,
        action: &'static str,
        source: NotifierError,
    },

    /// The notification went out but the new state was not written.
    #[error("{outcome} '{key}' but failed to store state: {source}")]
    Persist {
        key: String,
        outcome: Outcome,
        source: StoreError,
    },
}

impl ProcessError {
    /// Label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::Lock { .. } => "lock_error",
            ProcessError::Read { .. } => "read_error",
            ProcessError::Dispatch { .. } => "dispatch_error",
            ProcessError::Persist { .. } => "persist_error",
        }
    }
}
