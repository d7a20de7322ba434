//! Composite check key and the store keys derived from it.

use std::fmt;

/// Prefix of every storage key written by this service.
pub const KEY_PREFIX: &str = "notif";

/// Suffix appended to a storage key to form its lock key.
pub const LOCK_SUFFIX: &str = "/lock";

/// (node, check id) pair identifying one monitored check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckKey {
    pub node: String,
    pub check_id: String,
}

impl CheckKey {
    pub fn new(node: impl Into<String>, check_id: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            check_id: check_id.into(),
        }
    }

    /// `notif/<node>/<checkID>`, also used as the incident key.
    pub fn storage_key(&self) -> String {
        format!("{}/{}/{}", KEY_PREFIX, self.node, self.check_id)
    }

    /// `notif/<node>/<checkID>/lock`
    pub fn lock_key(&self) -> String {
        format!("{}{}", self.storage_key(), LOCK_SUFFIX)
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.node, self.check_id)
    }
}
