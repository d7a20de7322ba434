//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the selected notifier has its credentials
//! - Validate value ranges (workers > 0, Consul session TTL bounds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NotifConfig → Result<(), Vec<ValidationError>>
//! - Bootstrap mode never contacts a notifier, so credentials are optional there

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{NotifConfig, NotifierKind};

/// Consul rejects session TTLs outside this range.
const SESSION_TTL_RANGE_SECS: std::ops::RangeInclusive<u64> = 10..=86_400;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &NotifConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_http_url(&config.consul.address) {
        errors.push(ValidationError::new(
            "consul.address",
            format!("'{}' is not an http(s) URL", config.consul.address),
        ));
    }

    if !SESSION_TTL_RANGE_SECS.contains(&config.lock.session_ttl_secs) {
        errors.push(ValidationError::new(
            "lock.session_ttl_secs",
            format!(
                "must be between {} and {}",
                SESSION_TTL_RANGE_SECS.start(),
                SESSION_TTL_RANGE_SECS.end()
            ),
        ));
    }

    if config.lock.acquire_timeout_ms == 0 {
        errors.push(ValidationError::new("lock.acquire_timeout_ms", "must be > 0"));
    }

    if config.lock.initial_backoff_ms > config.lock.max_backoff_ms {
        errors.push(ValidationError::new(
            "lock.initial_backoff_ms",
            "must not exceed lock.max_backoff_ms",
        ));
    }

    if config.watch.channel_capacity == 0 {
        errors.push(ValidationError::new("watch.channel_capacity", "must be > 0"));
    }

    if config.processor.workers == 0 {
        errors.push(ValidationError::new("processor.workers", "must be > 0"));
    }

    if !config.notifier.bootstrap {
        match config.notifier.kind {
            NotifierKind::Pager => {
                if config.notifier.pager.service_key.is_empty() {
                    errors.push(ValidationError::new(
                        "notifier.pager.service_key",
                        "required when notifier.kind = \"pager\"",
                    ));
                }
                if !is_http_url(&config.notifier.pager.api_url) {
                    errors.push(ValidationError::new(
                        "notifier.pager.api_url",
                        "must be an http(s) URL",
                    ));
                }
            }
            NotifierKind::Slack => {
                if !is_http_url(&config.notifier.slack.webhook) {
                    errors.push(ValidationError::new(
                        "notifier.slack.webhook",
                        "required http(s) URL when notifier.kind = \"slack\"",
                    ));
                }
            }
            NotifierKind::Print | NotifierKind::Noop => {}
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&NotifConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = NotifConfig::default();
        config.consul.address = "not a url".into();
        config.lock.session_ttl_secs = 1;
        config.processor.workers = 0;
        config.watch.channel_capacity = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "consul.address",
                "lock.session_ttl_secs",
                "watch.channel_capacity",
                "processor.workers"
            ]
        );
    }

    #[test]
    fn test_bootstrap_skips_notifier_credentials() {
        let mut config = NotifConfig::default();
        config.notifier.kind = NotifierKind::Slack;
        assert!(validate_config(&config).is_err());

        config.notifier.bootstrap = true;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = NotifConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
