//! Bootstrap notifier: accepts everything, sends nothing.

use async_trait::async_trait;

use crate::notifier::types::{Alert, NotifierResponse, NotifierResult};
use crate::notifier::Notifier;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn raise_alert(&self, _incident_key: &str, _alert: &Alert) -> NotifierResult<NotifierResponse> {
        Ok(NotifierResponse::default())
    }

    async fn clear_alert(&self, _incident_key: &str, _alert: &Alert) -> NotifierResult<NotifierResponse> {
        Ok(NotifierResponse::default())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
