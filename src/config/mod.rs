//! Configuration merge system
//!
//! Implements the 3-layer configuration merge:
//! 1. Built-in defaults
//! 2. Config file (`--config`, `$CV_LIFECYCLE_CONFIG` or /etc/cv-lifecycle/config.toml)
//! 3. Environment overrides (`CV_LIFECYCLE_URL`, `CV_LIFECYCLE_USER`, `CV_LIFECYCLE_TOKEN`)

mod defaults;
mod effective;
mod merge;
mod settings;
mod sources;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use settings::{PollingSettings, RetentionSettings, ServerSettings, Settings, ViewSettings};
pub use sources::{env_layer, resolve_config_path, CONFIG_ENV, DEFAULT_CONFIG_PATH};
