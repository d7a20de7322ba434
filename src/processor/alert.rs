//! Alert text and links for an observation.

use crate::check::CheckObservation;
use crate::notifier::{Alert, EventDetails};

/// Renders [`Alert`]s from observations.
#[derive(Debug, Clone)]
pub struct AlertFormatter {
    url_template: String,
}

impl AlertFormatter {
    /// `url_template` may contain `{node}` and `{check_id}`.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }

    pub fn url(&self, obs: &CheckObservation) -> String {
        self.url_template
            .replace("{node}", &obs.node)
            .replace("{check_id}", &obs.check_id)
    }

    pub fn failing(&self, obs: &CheckObservation) -> Alert {
        self.alert(obs, "failing")
    }

    pub fn resolved(&self, obs: &CheckObservation) -> Alert {
        self.alert(obs, "resolved")
    }

    fn alert(&self, obs: &CheckObservation, verb: &str) -> Alert {
        Alert {
            description: format!("{}: {} {} for {}", obs.node, obs.check_id, verb, obs.service_name),
            url: self.url(obs),
            details: EventDetails::from(obs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckStatus;

    #[test]
    fn test_alert_text() {
        let mut obs = CheckObservation::new("node1", "service:web", CheckStatus::Critical);
        obs.service_name = "web".into();
        obs.output = "HTTP 503".into();

        let fmt = AlertFormatter::new("http://consul:8500/ui/#/dc1/nodes/{node}?check={check_id}");
        let alert = fmt.failing(&obs);
        assert_eq!(alert.description, "node1: service:web failing for web");
        assert_eq!(alert.url, "http://consul:8500/ui/#/dc1/nodes/node1?check=service:web");
        assert_eq!(alert.details.check_output, "HTTP 503");

        assert_eq!(fmt.resolved(&obs).description, "node1: service:web resolved for web");
    }
}
