//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for every value except the server URL and token,
//! which have no sensible default.

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// API user (default: "api")
    pub user: String,

    /// Verify the server certificate (default: false)
    pub verify_tls: bool,

    /// Per-request timeout in seconds (default: 120)
    pub timeout_seconds: u64,

    /// Page size for collection reads (default: everything in one page)
    pub per_page: u64,

    /// Queue gate settle delay in seconds (default: 5)
    pub settle_seconds: u64,

    /// Queue poll delay while busy (default: 10)
    pub busy_seconds: u64,

    /// Delay after a failed poll (default: 5)
    pub error_seconds: u64,

    /// Task detail poll delay (default: 3)
    pub task_seconds: u64,

    /// Failed polls tolerated before giving up (default: 4)
    pub max_communication_errors: u32,

    /// Resumes of one paused task (default: 3)
    pub max_unpause: u32,

    /// Newest versions kept per content view (default: 3)
    pub keep: usize,

    /// View excluded from every phase
    pub default_label: String,

    /// Baseline environment
    pub library_label: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            user: "api".to_string(),
            verify_tls: false,
            timeout_seconds: 120,
            per_page: 999_999_999,
            settle_seconds: 5,
            busy_seconds: 10,
            error_seconds: 5,
            task_seconds: 3,
            max_communication_errors: 4,
            max_unpause: 3,
            keep: 3,
            default_label: cv_api::DEFAULT_ORGANIZATION_VIEW.to_string(),
            library_label: cv_api::LIBRARY_LABEL.to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "server": {
                "user": self.user,
                "verify_tls": self.verify_tls,
                "timeout_seconds": self.timeout_seconds,
                "per_page": self.per_page
            },
            "polling": {
                "settle_seconds": self.settle_seconds,
                "busy_seconds": self.busy_seconds,
                "error_seconds": self.error_seconds,
                "task_seconds": self.task_seconds,
                "max_communication_errors": self.max_communication_errors,
                "max_unpause": self.max_unpause
            },
            "retention": {
                "keep": self.keep
            },
            "views": {
                "default_label": self.default_label,
                "library_label": self.library_label
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.user, "api");
        assert!(!defaults.verify_tls);
        assert_eq!(defaults.settle_seconds, 5);
        assert_eq!(defaults.busy_seconds, 10);
        assert_eq!(defaults.keep, 3);
        assert_eq!(defaults.default_label, "Default_Organization_View");
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();

        assert_eq!(value["server"]["timeout_seconds"], 120);
        assert_eq!(value["polling"]["max_unpause"], 3);
        assert_eq!(value["views"]["library_label"], "Library");
        assert!(value["server"].get("url").is_none());
    }
}
