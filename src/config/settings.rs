//! Typed view of the merged configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::HttpConfig;
use crate::pipeline::PipelineConfig;
use crate::retention::RetentionPolicy;
use crate::timing::PollingConfig;

use super::effective::ConfigError;

/// Longest accepted request timeout
const MAX_TIMEOUT_SECONDS: u64 = 3600;

/// `[server]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub url: String,
    pub user: String,
    #[serde(default)]
    pub token: String,
    pub verify_tls: bool,
    pub timeout_seconds: u64,
    pub per_page: u64,
}

/// `[polling]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingSettings {
    pub settle_seconds: u64,
    pub busy_seconds: u64,
    pub error_seconds: u64,
    pub task_seconds: u64,
    pub max_communication_errors: u32,
    pub max_unpause: u32,
}

/// `[retention]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionSettings {
    pub keep: usize,
}

/// `[views]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub default_label: String,
    pub library_label: String,
}

/// Complete settings after merging every layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub polling: PollingSettings,
    pub retention: RetentionSettings,
    pub views: ViewSettings,
}

impl Settings {
    /// Check values the pipeline cannot work without
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "server.url is required (config file or CV_LIFECYCLE_URL)".to_string(),
            ));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::ValidationError(format!(
                "server.url must start with http:// or https://, got '{}'",
                url
            )));
        }
        if self.server.token.is_empty() {
            return Err(ConfigError::ValidationError(
                "server.token is required (config file or CV_LIFECYCLE_TOKEN)".to_string(),
            ));
        }
        if self.server.timeout_seconds == 0 || self.server.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "server.timeout_seconds must be in (0, {}]",
                MAX_TIMEOUT_SECONDS
            )));
        }
        if self.retention.keep == 0 {
            return Err(ConfigError::ValidationError(
                "retention.keep must be at least 1".to_string(),
            ));
        }
        self.polling_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Transport settings
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.server.url.trim().to_string(),
            user: self.server.user.clone(),
            token: self.server.token.clone(),
            verify_tls: self.server.verify_tls,
            timeout_seconds: self.server.timeout_seconds,
            per_page: self.server.per_page.to_string(),
        }
    }

    /// Poll delays and budgets
    pub fn polling_config(&self) -> PollingConfig {
        let p = &self.polling;
        PollingConfig {
            settle: Duration::from_secs(p.settle_seconds),
            busy_interval: Duration::from_secs(p.busy_seconds),
            error_interval: Duration::from_secs(p.error_seconds),
            task_interval: Duration::from_secs(p.task_seconds),
            max_communication_errors: p.max_communication_errors,
            max_unpause: p.max_unpause,
        }
    }

    /// Everything the pipeline needs
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            polling: self.polling_config(),
            retention: RetentionPolicy::keep_last_n(self.retention.keep),
            default_view_label: self.views.default_label.clone(),
            library_label: self.views.library_label.clone(),
        }
    }
}
