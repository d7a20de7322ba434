//! Worker loop and key-sharded worker pool.
//!
//! # Responsibilities
//! - Drain the observation channel one observation at a time per worker
//! - Route every observation for a given check to the same worker
//! - Log and count per-observation failures without stopping
//!
//! # Design Decisions
//! - Shutdown is only observed between observations
//! - Sharding keeps per-key order within the process; the distributed lock
//!   covers other processes

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::check::{CheckKey, CheckObservation};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::processor::engine::Processor;
use crate::processor::error::ProcessError;

impl Processor {
    /// Process observations until the channel closes or shutdown fires.
    pub async fn run(
        self: Arc<Self>,
        mut drain: mpsc::Receiver<CheckObservation>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("processor received shutdown signal, exiting loop");
                    break;
                }
                next = drain.recv() => match next {
                    Some(obs) => self.handle(&obs).await,
                    None => {
                        tracing::info!("observation channel closed, processor exiting");
                        break;
                    }
                },
            }
        }
    }

    async fn handle(&self, obs: &CheckObservation) {
        match self.process(obs).await {
            Ok(outcome) => {
                metrics::record_observation(outcome.as_str());
            }
            Err(e) => {
                metrics::record_observation(e.kind());
                log_failure(&e);
            }
        }
    }
}

fn log_failure(e: &ProcessError) {
    match e {
        ProcessError::Lock { key, source } => {
            tracing::error!(error = %source, consul.key = %key, "failed to get lock")
        }
        ProcessError::Read { key, source } => {
            tracing::error!(error = %source, service.status = %key, "failed to find check")
        }
        ProcessError::Dispatch { key, action, source } => {
            tracing::error!(error = %source, incident.key = %key, action = *action, "failed to notify")
        }
        ProcessError::Persist { key, outcome, source } => {
            tracing::error!(
                error = %source,
                consul.key = %key,
                outcome = %outcome,
                "failed to store check, next delivery may notify again"
            )
        }
    }
}

/// Worker index for `key` among `workers`.
pub fn shard_for(key: &CheckKey, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % workers.max(1) as u64) as usize
}

/// Start `workers` processing tasks fed from `drain`.
///
/// The returned handle completes once every worker has exited.
pub fn spawn_workers(
    processor: Arc<Processor>,
    drain: mpsc::Receiver<CheckObservation>,
    workers: usize,
    capacity: usize,
    shutdown: &Shutdown,
) -> JoinHandle<()> {
    if workers <= 1 {
        return tokio::spawn(processor.run(drain, shutdown.subscribe()));
    }

    let mut senders = Vec::with_capacity(workers);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        senders.push(tx);
        handles.push(tokio::spawn(processor.clone().run(rx, shutdown.subscribe())));
    }

    let router_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        route(drain, senders, router_shutdown).await;
        join_all(handles).await;
    })
}

async fn route(
    mut drain: mpsc::Receiver<CheckObservation>,
    senders: Vec<mpsc::Sender<CheckObservation>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::info!(workers = senders.len(), "processor pool starting");
    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            next = drain.recv() => {
                let Some(obs) = next else { break };
                let shard = shard_for(&obs.key(), senders.len());
                if senders[shard].send(obs).await.is_err() {
                    tracing::error!(shard, "worker exited early, stopping router");
                    break;
                }
            }
        }
    }
    // Dropping the senders lets idle workers finish.
}
