//! Process-local store.
//!
//! # Responsibilities
//! - Back the engine when no Consul agent is available (local dry runs)
//! - Provide the same lock semantics as Consul within one process
//! - Count operations so callers can observe store traffic
//!
//! # Design Decisions
//! - One `tokio::sync::Mutex` per lock key, created lazily
//! - Lock acquisition is bounded by the configured timeout

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{LockHandle, StateStore};

/// In-memory key-value store with per-key locks.
#[derive(Debug)]
pub struct MemoryStore {
    values: DashMap<String, Vec<u8>>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    acquire_timeout: Duration,
    reads: AtomicUsize,
    writes: AtomicUsize,
    lock_acquisitions: AtomicUsize,
}

impl MemoryStore {
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            values: DashMap::new(),
            locks: DashMap::new(),
            acquire_timeout,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            lock_acquisitions: AtomicUsize::new(0),
        }
    }

    /// Number of `get` calls served.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of `put` calls served.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Number of locks handed out.
    pub fn lock_acquisitions(&self) -> usize {
        self.lock_acquisitions.load(Ordering::Relaxed)
    }

    /// Peek at a value without counting it as a read.
    pub fn snapshot(&self, key: &str) -> Option<Vec<u8>> {
        self.values.get(key).map(|v| v.value().clone())
    }

    fn lock_for(&self, lock_key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(lock_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.snapshot(key))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn lock(&self, lock_key: &str) -> StoreResult<Box<dyn LockHandle>> {
        let mutex = self.lock_for(lock_key);
        let guard = tokio::time::timeout(self.acquire_timeout, mutex.lock_owned())
            .await
            .map_err(|_| StoreError::LockTimeout {
                key: lock_key.to_string(),
                waited_ms: self.acquire_timeout.as_millis() as u64,
            })?;

        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(lock.key = %lock_key, "memory lock acquired");

        Ok(Box::new(MemoryLock {
            key: lock_key.to_string(),
            _guard: guard,
        }))
    }
}

struct MemoryLock {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl LockHandle for MemoryLock {
    fn key(&self) -> &str {
        &self.key
    }

    async fn release(self: Box<Self>) -> StoreResult<()> {
        tracing::trace!(lock.key = %self.key, "memory lock released");
        Ok(())
    }
}
