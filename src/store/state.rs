//! Typed access to persisted check state.

use std::sync::Arc;

use crate::check::{CheckKey, PersistedCheckState};
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{LockHandle, StateStore};

/// Reads, writes and locks [`PersistedCheckState`] records by [`CheckKey`].
#[derive(Clone)]
pub struct CheckStateStore {
    inner: Arc<dyn StateStore>,
}

impl CheckStateStore {
    pub fn new(inner: Arc<dyn StateStore>) -> Self {
        Self { inner }
    }

    /// Acquire the lock guarding `key`'s read-decide-write sequence.
    pub async fn lock(&self, key: &CheckKey) -> StoreResult<Box<dyn LockHandle>> {
        self.inner.lock(&key.lock_key()).await
    }

    /// Load the last persisted state. `Ok(None)` when the key was never written.
    ///
    /// An undecodable value is an error; it is never treated as "no prior state".
    pub async fn load(&self, key: &CheckKey) -> StoreResult<Option<PersistedCheckState>> {
        let storage_key = key.storage_key();
        let raw = match self.inner.get(&storage_key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| StoreError::Decode {
                key: storage_key,
                reason: e.to_string(),
            })
    }

    /// Overwrite the persisted state for `key`.
    pub async fn save(&self, key: &CheckKey, state: &PersistedCheckState) -> StoreResult<()> {
        let storage_key = key.storage_key();
        let raw = serde_json::to_vec(state).map_err(|e| StoreError::Encode {
            key: storage_key.clone(),
            reason: e.to_string(),
        })?;
        self.inner.put(&storage_key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckStatus;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_save_then_load() {
        let memory = Arc::new(MemoryStore::default());
        let store = CheckStateStore::new(memory.clone());
        let key = CheckKey::new("node1", "check");

        assert_eq!(store.load(&key).await.unwrap(), None);

        let state = PersistedCheckState::now(CheckStatus::Critical);
        store.save(&key, &state).await.unwrap();
        assert_eq!(store.load(&key).await.unwrap(), Some(state));

        let raw = memory.snapshot("notif/node1/check").unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["state"], "critical");
        assert!(json["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_an_error() {
        let memory = Arc::new(MemoryStore::default());
        memory.put("notif/node1/check", b"not json".to_vec()).await.unwrap();

        let store = CheckStateStore::new(memory);
        let err = store.load(&CheckKey::new("node1", "check")).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
