//! Log-only backend.

use async_trait::async_trait;

use crate::notifier::types::{Alert, NotifierResponse, NotifierResult};
use crate::notifier::Notifier;

/// Writes every alert to the log instead of sending it anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintNotifier;

fn logged(incident_key: &str) -> NotifierResponse {
    NotifierResponse {
        status: "logged".to_string(),
        message: String::new(),
        incident_key: incident_key.to_string(),
    }
}

#[async_trait]
impl Notifier for PrintNotifier {
    async fn raise_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse> {
        tracing::info!(
            incident.key = %incident_key,
            url = %alert.url,
            desc = %alert.description,
            event_details = ?alert.details,
            "trigger"
        );
        Ok(logged(incident_key))
    }

    async fn clear_alert(&self, incident_key: &str, alert: &Alert) -> NotifierResult<NotifierResponse> {
        tracing::info!(
            incident.key = %incident_key,
            url = %alert.url,
            desc = %alert.description,
            event_details = ?alert.details,
            "resolved"
        );
        Ok(logged(incident_key))
    }

    fn name(&self) -> &'static str {
        "print"
    }
}
