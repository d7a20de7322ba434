//! Chat webhook backend (Slack incoming webhooks).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::config::SlackConfig;
use crate::notifier::types::{Alert, NotifierError, NotifierResponse, NotifierResult};
use crate::notifier::Notifier;

#[derive(Debug, Serialize)]
struct SlackMessage<'a> {
    username: &'a str,
    channel: &'a str,
    icon_emoji: &'a str,
    attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
struct SlackAttachment {
    fallback: String,
    pretext: &'static str,
    color: &'static str,
    fields: Vec<SlackField>,
}

#[derive(Debug, Serialize)]
struct SlackField {
    title: &'static str,
    value: String,
    short: bool,
}

/// Visual cues for one kind of message.
struct Severity {
    color: &'static str,
    pretext: &'static str,
    verb: &'static str,
}

const CRITICAL: Severity = Severity {
    color: "#FF0000",
    pretext: ":red_circle: Critical health check",
    verb: "Failing",
};

const RESOLVED: Severity = Severity {
    color: "#00FF00",
    pretext: ":white_check_mark: Resolved health check",
    verb: "Resolved",
};

pub struct SlackNotifier {
    config: SlackConfig,
    client: Client,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn message(&self, alert: &Alert, severity: &Severity) -> SlackMessage<'_> {
        let d = &alert.details;
        SlackMessage {
            username: &self.config.username,
            channel: &self.config.channel,
            icon_emoji: &self.config.icon_emoji,
            attachments: vec![SlackAttachment {
                fallback: format!(
                    "{} check for {} on {}. See <{}>",
                    severity.verb, d.service_name, d.hostname, alert.url
                ),
                pretext: severity.pretext,
                color: severity.color,
                fields: vec![
                    SlackField {
                        title: "Service Impacted",
                        value: d.service_name.clone(),
                        short: false,
                    },
                    SlackField {
                        title: "URL",
                        value: alert.url.clone(),
                        short: false,
                    },
                    SlackField {
                        title: "Check Name",
                        value: d.check_name.clone(),
                        short: true,
                    },
                    SlackField {
                        title: "Check ID",
                        value: d.check_id.clone(),
                        short: true,
                    },
                    SlackField {
                        title: "Hostname",
                        value: d.hostname.clone(),
                        short: false,
                    },
                ],
            }],
        }
    }

    async fn post(&self, incident_key: &str, msg: &SlackMessage<'_>) -> NotifierResult<NotifierResponse> {
        let resp = self.client.post(&self.config.webhook).json(msg).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(NotifierResponse {
            status: "success".to_string(),
            message: "slack message posted".to_string(),
            incident_key: incident_key.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn raise_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse> {
        let msg = self.message(alert, &CRITICAL);
        self.post(incident_key, &msg).await
    }

    async fn clear_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse> {
        let msg = self.message(alert, &RESOLVED);
        self.post(incident_key, &msg).await
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
