//! notif: turns Consul health check transitions into alerts.

pub mod check;
pub mod config;
pub mod consul;
pub mod notifier;
pub mod processor;
pub mod store;
pub mod watch;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use check::{CheckKey, CheckObservation, CheckStatus, PersistedCheckState};
pub use config::NotifConfig;
pub use lifecycle::Shutdown;
pub use notifier::Notifier;
pub use processor::{Outcome, Processor};
pub use store::{CheckStateStore, StateStore};
