//! Key-value store and lock capabilities.

use async_trait::async_trait;

use crate::store::error::StoreResult;

/// A strongly consistent key-value store with per-key mutual exclusion.
///
/// Reads issued after a successful `put` (from any client) must observe it.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read raw bytes at `key`. `Ok(None)` means the key was never written.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Overwrite `key` with `value`.
    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Block until the lock at `lock_key` is held by the caller, or fail.
    async fn lock(&self, lock_key: &str) -> StoreResult<Box<dyn LockHandle>>;
}

/// A held distributed lock.
///
/// Callers must invoke [`LockHandle::release`] on every path. Dropping an
/// unreleased handle only frees local resources; remote locks then expire
/// with their session.
#[async_trait]
pub trait LockHandle: Send {
    fn key(&self) -> &str;

    async fn release(self: Box<Self>) -> StoreResult<()>;
}
