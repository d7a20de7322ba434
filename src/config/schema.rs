//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for notif.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::check::ignore::DEFAULT_IGNORED_PREFIXES;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NotifConfig {
    /// Consul agent connection settings.
    pub consul: ConsulConfig,

    /// Which state store backs the reconciliation engine.
    pub store: StoreConfig,

    /// Distributed lock tuning.
    pub lock: LockConfig,

    /// Health check watch settings.
    pub watch: WatchConfig,

    /// Reconciliation engine settings.
    pub processor: ProcessorConfig,

    /// Notification backend selection.
    pub notifier: NotifierConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Consul agent connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsulConfig {
    /// Agent HTTP address (e.g., "http://127.0.0.1:8500").
    pub address: String,

    /// Datacenter to query; agent default when unset.
    pub datacenter: Option<String>,

    /// ACL token sent as `X-Consul-Token`.
    pub token: Option<String>,

    /// Timeout for non-blocking requests in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8500".to_string(),
            datacenter: None,
            token: None,
            request_timeout_secs: 10,
        }
    }
}

/// State store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Consul KV with session locks.
    #[default]
    Consul,
    /// Process-local map; state is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
}

/// Distributed lock tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockConfig {
    /// Session TTL in seconds; the lock is released if the holder dies.
    pub session_ttl_secs: u64,

    /// Maximum time to wait for lock acquisition in milliseconds.
    pub acquire_timeout_ms: u64,

    /// Initial backoff between acquisition attempts in milliseconds.
    pub initial_backoff_ms: u64,

    /// Maximum backoff between acquisition attempts in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 15,
            acquire_timeout_ms: 10_000,
            initial_backoff_ms: 50,
            max_backoff_ms: 1_000,
        }
    }
}

/// Health check watch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Blocking query wait time in seconds.
    pub wait_secs: u64,

    /// Base retry delay after a failed query in milliseconds.
    pub retry_base_ms: u64,

    /// Maximum retry delay in milliseconds.
    pub retry_max_ms: u64,

    /// Capacity of the observation channel (backpressure).
    pub channel_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            wait_secs: 300,
            retry_base_ms: 500,
            retry_max_ms: 30_000,
            channel_capacity: 1024,
        }
    }
}

/// Reconciliation engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Number of reconciliation workers. Observations are sharded by check key.
    pub workers: usize,

    /// Check ID prefixes that are never processed.
    pub ignored_prefixes: Vec<String>,

    /// Link included in alerts. `{node}` and `{check_id}` are substituted.
    pub ui_url_template: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            ignored_prefixes: DEFAULT_IGNORED_PREFIXES.iter().map(|s| s.to_string()).collect(),
            ui_url_template: "http://127.0.0.1:8500/ui/#/dc1/nodes/{node}".to_string(),
        }
    }
}

/// Notification backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Pager,
    Slack,
    /// Log every alert instead of sending it.
    #[default]
    Print,
    Noop,
}

impl std::str::FromStr for NotifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pager" => Ok(NotifierKind::Pager),
            "slack" => Ok(NotifierKind::Slack),
            "print" => Ok(NotifierKind::Print),
            "noop" => Ok(NotifierKind::Noop),
            other => Err(format!("unknown notifier '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub kind: NotifierKind,

    /// Bootstrap mode: persist current world state without alerting.
    pub bootstrap: bool,

    /// HTTP timeout for backend calls in seconds.
    pub timeout_secs: u64,

    pub pager: PagerConfig,

    pub slack: SlackConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            bootstrap: false,
            timeout_secs: 10,
            pager: PagerConfig::default(),
            slack: SlackConfig::default(),
        }
    }
}

/// Paging backend settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Integration (service) key.
    pub service_key: String,

    /// Events endpoint.
    pub api_url: String,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            service_key: String::new(),
            api_url: "https://events.pagerduty.com/generic/2010-04-15/create_event.json".to_string(),
        }
    }
}

// Keep the service key out of logs.
impl std::fmt::Debug for PagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerConfig")
            .field("service_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Chat webhook settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SlackConfig {
    pub webhook: String,
    pub username: String,
    pub channel: String,
    pub icon_emoji: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook: String::new(),
            username: "notif".to_string(),
            channel: String::new(),
            icon_emoji: ":rotating_light:".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "notif=info".to_string(),
            log_json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9102".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: NotifConfig = toml::from_str("").unwrap();
        assert_eq!(config.consul.address, "http://127.0.0.1:8500");
        assert_eq!(config.store.kind, StoreKind::Consul);
        assert_eq!(config.processor.workers, 1);
        assert_eq!(
            config.processor.ignored_prefixes,
            vec!["_node_maintenance", "_service_maintenance"]
        );
        assert_eq!(config.notifier.kind, NotifierKind::Print);
        assert!(!config.notifier.bootstrap);
    }

    #[test]
    fn test_partial_sections() {
        let raw = r##"
            [notifier]
            kind = "slack"

            [notifier.slack]
            webhook = "https://hooks.example.com/abc"
            channel = "#ops"

            [store]
            kind = "memory"
        "##;
        let config: NotifConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.notifier.kind, NotifierKind::Slack);
        assert_eq!(config.notifier.slack.channel, "#ops");
        assert_eq!(config.notifier.slack.username, "notif");
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert_eq!(config.lock.acquire_timeout_ms, 10_000);
    }

    #[test]
    fn test_pager_key_redacted_in_debug() {
        let pager = PagerConfig {
            service_key: "super-secret".into(),
            ..Default::default()
        };
        assert!(!format!("{:?}", pager).contains("super-secret"));
    }
}
