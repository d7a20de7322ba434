//! Notification payloads and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::check::CheckObservation;

/// Structured details attached to every alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventDetails {
    pub hostname: String,
    pub service_name: String,
    pub check_name: String,
    pub check_id: String,
    pub check_output: String,
}

impl From<&CheckObservation> for EventDetails {
    fn from(obs: &CheckObservation) -> Self {
        Self {
            hostname: obs.node.clone(),
            service_name: obs.service_name.clone(),
            check_name: obs.check_name.clone(),
            check_id: obs.check_id.clone(),
            check_output: obs.output.clone(),
        }
    }
}

/// Everything a backend needs to render one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Free-text summary.
    pub description: String,
    /// Link to the check in the cluster UI.
    pub url: String,
    pub details: EventDetails,
}

/// Backend acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotifierResponse {
    pub status: String,
    pub message: String,
    pub incident_key: String,
}

/// Errors that can occur delivering a notification.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// Request never produced a response.
    #[error("notifier transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend rejected the request.
    #[error("notifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend response could not be decoded.
    #[error("undecodable notifier response: {0}")]
    Decode(String),
}

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;
