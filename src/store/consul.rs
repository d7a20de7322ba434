//! Consul KV store with session locks.
//!
//! # Responsibilities
//! - Map raw KV get/put onto the Consul HTTP API
//! - Acquire locks with a fresh session per acquisition
//! - Keep the session alive while the lock is held
//!
//! # Design Decisions
//! - Sessions use `Behavior=release` so a crashed holder frees its lock at TTL
//! - Contended acquisition retries with jittered backoff until a deadline
//! - Release always destroys the session, even if the release call failed

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::config::LockConfig;
use crate::consul::{ConsulClient, ConsulError};
use crate::resilience::Backoff;
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{LockHandle, StateStore};

/// State store backed by a Consul agent.
#[derive(Debug, Clone)]
pub struct ConsulStore {
    client: ConsulClient,
    lock: LockConfig,
    /// Session name prefix, unique per process.
    holder_id: String,
}

impl ConsulStore {
    pub fn new(client: ConsulClient, lock: LockConfig) -> Self {
        Self {
            client,
            lock,
            holder_id: format!("notif-{}", uuid::Uuid::new_v4()),
        }
    }

    async fn destroy_session(&self, lock_key: &str, session: &str) {
        if let Err(e) = self.client.session_destroy(session).await {
            tracing::warn!(
                error = %e,
                consul.key = %lock_key,
                consul.session = %session,
                "failed to destroy session"
            );
        }
    }
}

fn map_err(key: &str, e: ConsulError) -> StoreError {
    match e {
        ConsulError::Status { status, .. } => StoreError::Status {
            key: key.to_string(),
            status,
        },
        other => StoreError::Transport(other.to_string()),
    }
}

#[async_trait]
impl StateStore for ConsulStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.client.kv_get(key).await.map_err(|e| map_err(key, e))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.client.kv_put(key, value).await.map_err(|e| map_err(key, e))
    }

    async fn lock(&self, lock_key: &str) -> StoreResult<Box<dyn LockHandle>> {
        let ttl = Duration::from_secs(self.lock.session_ttl_secs);
        let session = self
            .client
            .session_create(&self.holder_id, ttl)
            .await
            .map_err(|e| map_err(lock_key, e))?;

        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.lock.acquire_timeout_ms);
        let mut backoff = Backoff::new(self.lock.initial_backoff_ms, self.lock.max_backoff_ms);

        loop {
            match self.client.kv_acquire(lock_key, &session).await {
                Ok(true) => {
                    tracing::debug!(
                        consul.key = %lock_key,
                        consul.session = %session,
                        attempts = backoff.attempt() + 1,
                        "lock acquired"
                    );
                    let renewer = spawn_renewer(self.client.clone(), session.clone(), ttl);
                    return Ok(Box::new(ConsulLock {
                        client: self.client.clone(),
                        key: lock_key.to_string(),
                        session,
                        renewer,
                    }));
                }
                Ok(false) => {}
                Err(e) => {
                    self.destroy_session(lock_key, &session).await;
                    return Err(map_err(lock_key, e));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                self.destroy_session(lock_key, &session).await;
                return Err(StoreError::LockTimeout {
                    key: lock_key.to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }

            let delay = backoff.next_delay().min(deadline - now);
            tracing::trace!(
                consul.key = %lock_key,
                backoff_ms = delay.as_millis() as u64,
                "lock held elsewhere, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Renew the session at half its TTL until aborted.
fn spawn_renewer(client: ConsulClient, session: String, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ttl / 2);
        // First tick fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = client.session_renew(&session).await {
                tracing::warn!(error = %e, consul.session = %session, "session renew failed");
            }
        }
    })
}

struct ConsulLock {
    client: ConsulClient,
    key: String,
    session: String,
    renewer: JoinHandle<()>,
}

#[async_trait]
impl LockHandle for ConsulLock {
    fn key(&self) -> &str {
        &self.key
    }

    async fn release(self: Box<Self>) -> StoreResult<()> {
        self.renewer.abort();

        let released = self.client.kv_release(&self.key, &self.session).await;
        let destroyed = self.client.session_destroy(&self.session).await;

        tracing::debug!(consul.key = %self.key, "lock released");

        match released {
            Ok(true) => {}
            Ok(false) => {
                return Err(StoreError::LockLost {
                    key: self.key.clone(),
                    reason: format!("session {} no longer held the lock", self.session),
                })
            }
            Err(e) => return Err(map_err(&self.key, e)),
        }
        destroyed.map_err(|e| map_err(&self.key, e))
    }
}

impl Drop for ConsulLock {
    fn drop(&mut self) {
        self.renewer.abort();
    }
}
