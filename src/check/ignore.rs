//! Check ID ignore-list.
//!
//! Maintenance-mode checks are synthetic and flip to critical whenever an
//! operator drains a node, so they are dropped before any store contact.

/// Prefixes ignored when no list is configured.
pub const DEFAULT_IGNORED_PREFIXES: &[&str] = &["_node_maintenance", "_service_maintenance"];

/// Set of check ID prefixes excluded from processing.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    prefixes: Vec<String>,
}

impl IgnoreList {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Return true if `check_id` starts with any ignored prefix.
    pub fn is_ignored(&self, check_id: &str) -> bool {
        self.prefixes.iter().any(|p| check_id.starts_with(p.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED_PREFIXES.iter().copied())
    }
}
