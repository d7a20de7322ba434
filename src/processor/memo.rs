//! Per-instance memo of last known check state.
//!
//! # Design Decisions
//! - Advisory only: a hit with a different status always falls back to the store
//! - Only mutated after a successful store read or write
//! - Shared by the workers of one processor, never across processes

use dashmap::DashMap;

use crate::check::{CheckKey, CheckStatus, PersistedCheckState};
use crate::observability::metrics;

#[derive(Debug, Default)]
pub struct MemoCache {
    entries: DashMap<CheckKey, PersistedCheckState>,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CheckKey) -> Option<PersistedCheckState> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// True if the memoized status for `key` equals `status`.
    pub fn matches(&self, key: &CheckKey, status: &CheckStatus) -> bool {
        self.entries
            .get(key)
            .map(|e| &e.value().status == status)
            .unwrap_or(false)
    }

    pub fn insert(&self, key: CheckKey, state: PersistedCheckState) {
        tracing::debug!(
            memoize.key = %key.storage_key(),
            check.status = %state.status,
            check.updated_at = %state.updated_at,
            "memoizing check"
        );
        self.entries.insert(key, state);
        metrics::record_memo_size(self.entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_only_same_status() {
        let memo = MemoCache::new();
        let key = CheckKey::new("n", "c");
        assert!(!memo.matches(&key, &CheckStatus::Critical));

        memo.insert(key.clone(), PersistedCheckState::now(CheckStatus::Critical));
        assert!(memo.matches(&key, &CheckStatus::Critical));
        assert!(!memo.matches(&key, &CheckStatus::Passing));
        assert_eq!(memo.len(), 1);

        memo.insert(key.clone(), PersistedCheckState::now(CheckStatus::Passing));
        assert!(memo.matches(&key, &CheckStatus::Passing));
        assert_eq!(memo.len(), 1);
    }
}
