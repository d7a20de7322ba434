//! Notification subsystem.
//!
//! # Data Flow
//! ```text
//! Processor decides a transition happened
//!     → Notifier::raise_alert / Notifier::clear_alert
//!         → pager.rs (trigger / resolve events)
//!         → slack.rs (webhook attachment)
//!         → print.rs (log line)
//!         → noop.rs (bootstrap mode)
//! ```
//!
//! # Design Decisions
//! - The incident key is the check's storage key so trigger and resolve pair up
//! - Backends are stateless; deduplication is the processor's job
//! - Any backend error aborts the observation so the next delivery retries

pub mod noop;
pub mod pager;
pub mod print;
pub mod slack;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{NotifierConfig, NotifierKind};

pub use noop::NoopNotifier;
pub use pager::PagerNotifier;
pub use print::PrintNotifier;
pub use slack::SlackNotifier;
pub use types::{Alert, EventDetails, NotifierError, NotifierResponse, NotifierResult};

/// Outbound alerting capability.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Open (or re-open) the incident identified by `incident_key`.
    ///
    /// Backends that deduplicate by key must not create a second incident
    /// when called twice with the same key.
    async fn raise_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse>;

    /// Resolve the incident identified by `incident_key`.
    async fn clear_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse>;

    /// Short backend name for logs and metrics.
    fn name(&self) -> &'static str;
}

/// Build the notifier selected by configuration.
///
/// Bootstrap mode always yields the no-op notifier.
pub fn build_notifier(config: &NotifierConfig) -> Arc<dyn Notifier> {
    if config.bootstrap {
        tracing::info!("bootstrap mode: alerts are recorded but never sent");
        return Arc::new(NoopNotifier);
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            reqwest::Client::new()
        });

    match config.kind {
        NotifierKind::Pager => Arc::new(PagerNotifier::new(config.pager.clone(), client)),
        NotifierKind::Slack => Arc::new(SlackNotifier::new(config.slack.clone(), client)),
        NotifierKind::Print => Arc::new(PrintNotifier),
        NotifierKind::Noop => Arc::new(NoopNotifier),
    }
}
