//! Paging backend (PagerDuty generic events API).
//!
//! # Responsibilities
//! - Send `trigger` events on raise and `resolve` events on clear
//! - Reuse the incident key so the service deduplicates and pairs events

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::PagerConfig;
use crate::notifier::types::{Alert, EventDetails, NotifierError, NotifierResponse, NotifierResult};
use crate::notifier::Notifier;

const CLIENT_NAME: &str = "notif";

#[derive(Debug, Serialize)]
struct PagerEvent<'a> {
    service_key: &'a str,
    event_type: &'static str,
    description: &'a str,
    incident_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a EventDetails>,
}

pub struct PagerNotifier {
    config: PagerConfig,
    client: Client,
}

impl PagerNotifier {
    pub fn new(config: PagerConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn send(&self, event: &PagerEvent<'_>) -> NotifierResult<NotifierResponse> {
        let resp = self
            .client
            .post(&self.config.api_url)
            .json(event)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(NotifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| NotifierError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Notifier for PagerNotifier {
    async fn raise_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse> {
        self.send(&PagerEvent {
            service_key: &self.config.service_key,
            event_type: "trigger",
            description: &alert.description,
            incident_key,
            client: Some(CLIENT_NAME),
            client_url: Some(&alert.url),
            details: Some(&alert.details),
        })
        .await
    }

    async fn clear_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse> {
        self.send(&PagerEvent {
            service_key: &self.config.service_key,
            event_type: "resolve",
            description: &alert.description,
            incident_key,
            client: None,
            client_url: None,
            details: None,
        })
        .await
    }

    fn name(&self) -> &'static str {
        "pager"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_event_omits_trigger_fields() {
        let event = PagerEvent {
            service_key: "key",
            event_type: "resolve",
            description: "node1: check resolved for web",
            incident_key: "notif/node1/check",
            client: None,
            client_url: None,
            details: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "resolve");
        assert!(json.get("client").is_none());
        assert!(json.get("details").is_none());
    }
}
