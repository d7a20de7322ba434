//! Consul HTTP API payloads and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::check::{CheckObservation, CheckStatus};

/// Errors from the Consul HTTP API.
#[derive(Debug, Error)]
pub enum ConsulError {
    #[error("invalid Consul address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Consul request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Consul returned status {status} for {path}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("unexpected Consul response for {path}: {reason}")]
    Decode { path: String, reason: String },
}

pub type ConsulResult<T> = Result<T, ConsulError>;

/// Body of `PUT /v1/session/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionRequest {
    pub name: String,
    #[serde(rename = "TTL")]
    pub ttl: String,
    pub behavior: String,
    pub lock_delay: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionCreated {
    #[serde(rename = "ID")]
    pub id: String,
}

/// One entry of `GET /v1/health/state/any`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct HealthCheck {
    pub node: String,
    #[serde(rename = "CheckID")]
    pub check_id: String,
    pub name: String,
    pub status: String,
    pub notes: String,
    pub output: String,
    #[serde(rename = "ServiceID")]
    pub service_id: String,
    pub service_name: String,
}

impl From<HealthCheck> for CheckObservation {
    fn from(hc: HealthCheck) -> Self {
        CheckObservation {
            node: hc.node,
            check_id: hc.check_id,
            status: CheckStatus::from(hc.status),
            output: hc.output,
            service_name: hc.service_name,
            check_name: hc.name,
        }
    }
}
