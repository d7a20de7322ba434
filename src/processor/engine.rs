//! The reconciliation protocol for a single observation.
//!
//! ```text
//! ignored prefix? ──yes──▶ Ignored
//!     │
//! acquire lock ──err──▶ Lock error
//!     │
//! memo status == incoming? ──yes──▶ Unchanged
//!     │
//! store status == incoming? ──yes──▶ memoize, Unchanged
//!     │
//! critical → raise / passing with prior → clear / otherwise nothing
//!     │ (dispatch error: stop, nothing written)
//! write state → memoize
//!     │
//! release lock (on every path after acquisition)
//! ```

use std::fmt;
use std::sync::Arc;

use crate::check::{CheckKey, CheckObservation, CheckStatus, IgnoreList, PersistedCheckState};
use crate::notifier::Notifier;
use crate::observability::metrics;
use crate::processor::alert::AlertFormatter;
use crate::processor::error::ProcessError;
use crate::processor::memo::MemoCache;
use crate::store::CheckStateStore;

/// What happened to one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Check ID matched the ignore-list.
    Ignored,
    /// Status equals the last recorded one; nothing done.
    Unchanged,
    /// Alert raised and new state stored.
    Notified,
    /// Alert cleared and new state stored.
    Resolved,
    /// State changed and stored without contacting the notifier.
    Recorded,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ignored => "ignored",
            Outcome::Unchanged => "unchanged",
            Outcome::Notified => "notified",
            Outcome::Resolved => "resolved",
            Outcome::Recorded => "recorded",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the memoize-then-store lookup.
enum Lookup {
    Unchanged,
    /// Status differs from the recorded one; carries the stored state, if any.
    Transition(Option<PersistedCheckState>),
}

/// Reconciliation engine.
pub struct Processor {
    store: CheckStateStore,
    notifier: Arc<dyn Notifier>,
    memo: MemoCache,
    ignore: IgnoreList,
    alerts: AlertFormatter,
}

impl Processor {
    pub fn new(
        store: CheckStateStore,
        notifier: Arc<dyn Notifier>,
        ignore: IgnoreList,
        alerts: AlertFormatter,
    ) -> Self {
        Self {
            store,
            notifier,
            memo: MemoCache::new(),
            ignore,
            alerts,
        }
    }

    pub fn memo(&self) -> &MemoCache {
        &self.memo
    }

    /// Reconcile one observation.
    pub async fn process(&self, obs: &CheckObservation) -> Result<Outcome, ProcessError> {
        if self.ignore.is_ignored(&obs.check_id) {
            tracing::trace!(check.id = %obs.check_id, "ignoring check");
            return Ok(Outcome::Ignored);
        }

        let key = obs.key();
        let lock = self
            .store
            .lock(&key)
            .await
            .map_err(|source| ProcessError::Lock {
                key: key.lock_key(),
                source,
            })?;
        tracing::debug!(consul.key = %lock.key(), "locked key");

        let result = self.reconcile(&key, obs).await;

        let lock_key = lock.key().to_string();
        if let Err(e) = lock.release().await {
            tracing::warn!(error = %e, consul.key = %lock_key, "failed to release lock");
        }

        result
    }

    /// Everything that runs while the lock is held.
    async fn reconcile(&self, key: &CheckKey, obs: &CheckObservation) -> Result<Outcome, ProcessError> {
        let prior = match self.lookup(key, &obs.status).await? {
            Lookup::Unchanged => {
                tracing::debug!(service.status = %key.storage_key(), "not processing healthcheck");
                return Ok(Outcome::Unchanged);
            }
            Lookup::Transition(prior) => prior,
        };

        let outcome = self.dispatch(key, obs, prior.as_ref()).await?;

        let state = PersistedCheckState::now(obs.status.clone());
        tracing::debug!(consul.key = %key.storage_key(), "storing check");
        if let Err(source) = self.store.save(key, &state).await {
            metrics::record_store_error("put");
            // Not memoized: the next delivery re-reads the store and may notify again.
            return Err(ProcessError::Persist {
                key: key.storage_key(),
                outcome,
                source,
            });
        }
        self.memo.insert(key.clone(), state);

        Ok(outcome)
    }

    /// Memo first, then the store.
    async fn lookup(&self, key: &CheckKey, status: &CheckStatus) -> Result<Lookup, ProcessError> {
        if self.memo.matches(key, status) {
            return Ok(Lookup::Unchanged);
        }

        match self.memo.get(key) {
            None => tracing::debug!(memoize.key = %key.storage_key(), "failed to find memoized check"),
            Some(mc) => tracing::debug!(
                memoize.key = %key.storage_key(),
                mc.status = %mc.status,
                hc.status = %status,
                "memoized check did not match healthcheck"
            ),
        }

        tracing::debug!(consul.key = %key.storage_key(), "fetching kv");
        let stored = self.store.load(key).await.map_err(|source| {
            metrics::record_store_error("get");
            ProcessError::Read {
                key: key.storage_key(),
                source,
            }
        })?;

        match stored {
            Some(state) if &state.status == status => {
                tracing::debug!(
                    memoize.key = %key.storage_key(),
                    sc.status = %state.status,
                    hc.status = %status,
                    "stored check matched healthcheck"
                );
                self.memo.insert(key.clone(), state);
                Ok(Lookup::Unchanged)
            }
            other => Ok(Lookup::Transition(other)),
        }
    }

    async fn dispatch(
        &self,
        key: &CheckKey,
        obs: &CheckObservation,
        prior: Option<&PersistedCheckState>,
    ) -> Result<Outcome, ProcessError> {
        let incident_key = key.storage_key();

        match &obs.status {
            CheckStatus::Critical => {
                tracing::debug!(service.status = %incident_key, "notifying");
                let alert = self.alerts.failing(obs);
                let result = self.notifier.raise_alert(&incident_key, &alert).await;
                metrics::record_notification("raise", result.is_ok());
                let resp = result.map_err(|source| ProcessError::Dispatch {
                    key: incident_key.clone(),
                    action: "raise alert",
                    source,
                })?;
                tracing::info!(
                    incident.key = %incident_key,
                    notifier = self.notifier.name(),
                    response.status = %resp.status,
                    response.message = %resp.message,
                    "alert raised"
                );
                Ok(Outcome::Notified)
            }
            // Nothing was ever raised for a check we have no record of.
            CheckStatus::Passing if has_recorded_status(prior) => {
                tracing::debug!(service.status = %incident_key, "resolving");
                let alert = self.alerts.resolved(obs);
                let result = self.notifier.clear_alert(&incident_key, &alert).await;
                metrics::record_notification("clear", result.is_ok());
                let resp = result.map_err(|source| ProcessError::Dispatch {
                    key: incident_key.clone(),
                    action: "clear alert",
                    source,
                })?;
                tracing::info!(
                    incident.key = %incident_key,
                    notifier = self.notifier.name(),
                    response.status = %resp.status,
                    response.message = %resp.message,
                    "alert cleared"
                );
                Ok(Outcome::Resolved)
            }
            _ => Ok(Outcome::Recorded),
        }
    }
}

fn has_recorded_status(prior: Option<&PersistedCheckState>) -> bool {
    prior.map(|p| !p.status.as_str().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::NoopNotifier;
    use crate::store::{MemoryStore, StateStore};

    fn processor(memory: Arc<MemoryStore>) -> Processor {
        Processor::new(
            CheckStateStore::new(memory),
            Arc::new(NoopNotifier),
            IgnoreList::default(),
            AlertFormatter::new("http://ui/{node}"),
        )
    }

    #[tokio::test]
    async fn test_unknown_status_is_recorded_not_notified() {
        let memory = Arc::new(MemoryStore::default());
        let p = processor(memory.clone());

        let obs = CheckObservation::new("n", "c", CheckStatus::from("warning"));
        assert_eq!(p.process(&obs).await.unwrap(), Outcome::Recorded);

        let raw = memory.snapshot("notif/n/c").unwrap();
        let state: PersistedCheckState = serde_json::from_slice(&raw).unwrap();
        assert_eq!(state.status, CheckStatus::Other("warning".into()));
    }

    #[test]
    fn test_empty_recorded_status_does_not_resolve() {
        let prior = PersistedCheckState::now(CheckStatus::from(""));
        assert!(!has_recorded_status(Some(&prior)));
        assert!(!has_recorded_status(None));
        assert!(has_recorded_status(Some(&PersistedCheckState::now(CheckStatus::Critical))));
    }

    #[tokio::test]
    async fn test_lock_released_after_unchanged() {
        let memory = Arc::new(MemoryStore::new(std::time::Duration::from_millis(50)));
        let p = processor(memory.clone());
        let obs = CheckObservation::new("n", "c", CheckStatus::Critical);

        p.process(&obs).await.unwrap();
        assert_eq!(p.process(&obs).await.unwrap(), Outcome::Unchanged);

        // A leaked lock would time out here.
        let lock = memory.lock("notif/n/c/lock").await.unwrap();
        lock.release().await.unwrap();
    }
}
