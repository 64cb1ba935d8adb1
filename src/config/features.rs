//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,

    /// Keep the sent tracking link ledger across restarts
    #[serde(default = "default_persist_tracking_links")]
    pub persist_tracking_links: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            json_logs: false,
            persist_tracking_links: default_persist_tracking_links(),
        }
    }
}

fn default_persist_tracking_links() -> bool {
    true
}
