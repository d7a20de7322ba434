//! Consul health check watcher.
//!
//! # Responsibilities
//! - Long-poll `/v1/health/state/any` with blocking queries
//! - Emit every check whenever the index changes
//! - Back off on errors and keep going until shutdown
//!
//! # Design Decisions
//! - Emits full state, not diffs; the processor deduplicates
//! - Index going backwards (agent restart, snapshot restore) resets to 0
//! - A closed observation channel ends the watch

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::check::CheckObservation;
use crate::config::WatchConfig;
use crate::consul::ConsulClient;
use crate::resilience::Backoff;
use crate::watch::WatchError;

pub struct ConsulWatcher {
    client: ConsulClient,
    config: WatchConfig,
    drain: mpsc::Sender<CheckObservation>,
}

impl ConsulWatcher {
    pub fn new(client: ConsulClient, config: WatchConfig, drain: mpsc::Sender<CheckObservation>) -> Self {
        Self {
            client,
            config,
            drain,
        }
    }

    /// Watch until shutdown or until the processor side of the channel closes.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), WatchError> {
        tracing::info!(
            address = %self.client.address(),
            wait_secs = self.config.wait_secs,
            "health check watch starting"
        );

        let wait = Duration::from_secs(self.config.wait_secs);
        let mut backoff = Backoff::new(self.config.retry_base_ms, self.config.retry_max_ms);
        let mut index = 0u64;

        loop {
            let query = self.client.health_checks(index, wait);
            let result = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("watcher received shutdown signal, exiting loop");
                    return Ok(());
                }
                result = query => result,
            };

            match result {
                Ok((new_index, checks)) => {
                    backoff.reset();
                    if new_index == index {
                        // Wait timed out with no change.
                        continue;
                    }
                    tracing::debug!(index = new_index, checks = checks.len(), "health checks changed");
                    index = next_index(index, new_index);

                    for hc in checks {
                        self.drain
                            .send(CheckObservation::from(hc))
                            .await
                            .map_err(|_| WatchError::ChannelClosed)?;
                    }
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "health check query failed"
                    );
                    tokio::select! {
                        _ = shutdown.recv() => return Ok(()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

/// Index to send on the next blocking query.
fn next_index(previous: u64, returned: u64) -> u64 {
    if returned < previous {
        0
    } else {
        returned
    }
}
