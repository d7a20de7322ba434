//! Observation and persisted state types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::check::key::CheckKey;

/// Status reported by a health check.
///
/// Anything other than `passing` or `critical` is kept verbatim and treated
/// as "not passing" without ever triggering a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    Passing,
    Critical,
    Other(String),
}

impl CheckStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CheckStatus::Passing => "passing",
            CheckStatus::Critical => "critical",
            CheckStatus::Other(s) => s,
        }
    }
}

impl From<&str> for CheckStatus {
    fn from(s: &str) -> Self {
        match s {
            "passing" => CheckStatus::Passing,
            "critical" => CheckStatus::Critical,
            other => CheckStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for CheckStatus {
    fn from(s: String) -> Self {
        CheckStatus::from(s.as_str())
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CheckStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CheckStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(CheckStatus::from(s))
    }
}

/// A single health check observation produced by the watch source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckObservation {
    /// Node the check runs on.
    pub node: String,
    /// Check identifier, unique per node.
    pub check_id: String,
    /// Current status.
    pub status: CheckStatus,
    /// Human readable check output.
    pub output: String,
    /// Service the check belongs to (empty for node checks).
    pub service_name: String,
    /// Check display name.
    pub check_name: String,
}

impl CheckObservation {
    pub fn new(node: impl Into<String>, check_id: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            node: node.into(),
            check_id: check_id.into(),
            status,
            output: String::new(),
            service_name: String::new(),
            check_name: String::new(),
        }
    }

    /// Composite key identifying this check.
    pub fn key(&self) -> CheckKey {
        CheckKey::new(&self.node, &self.check_id)
    }
}

/// Durable record of the last status written for a check.
///
/// Stored as `{"state": <status>, "updated_at": <RFC3339 UTC>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCheckState {
    #[serde(rename = "state")]
    pub status: CheckStatus,
    pub updated_at: DateTime<Utc>,
}

impl PersistedCheckState {
    /// Record `status` as of now.
    pub fn now(status: CheckStatus) -> Self {
        Self {
            status,
            updated_at: Utc::now(),
        }
    }
}
