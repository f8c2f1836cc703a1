//! Locating the config file and reading environment overrides

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "CV_LIFECYCLE_CONFIG";

/// Config file used when nothing else is given and it exists
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cv-lifecycle/config.toml";

/// Environment variables overriding `[server]` keys
const SERVER_ENV: &[(&str, &str)] = &[
    ("CV_LIFECYCLE_URL", "url"),
    ("CV_LIFECYCLE_USER", "user"),
    ("CV_LIFECYCLE_TOKEN", "token"),
];

/// Pick the config file: command line, then `CV_LIFECYCLE_CONFIG`,
/// then the default path if present.
pub fn resolve_config_path<F>(cli: Option<&Path>, lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = cli {
        return Some(path.to_path_buf());
    }
    if let Some(path) = lookup(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let default = Path::new(DEFAULT_CONFIG_PATH);
    default.exists().then(|| default.to_path_buf())
}

/// Build the environment layer, or None when no variable is set
pub fn env_layer<F>(lookup: F) -> Option<Value>
where
    F: Fn(&str) -> Option<String>,
{
    let server: Map<String, Value> = SERVER_ENV
        .iter()
        .filter_map(|(var, key)| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .map(|v| (key.to_string(), Value::String(v)))
        })
        .collect();

    if server.is_empty() {
        None
    } else {
        Some(serde_json::json!({ "server": server }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_cli_path_wins() {
        let lookup = vars(&[(CONFIG_ENV, "/from/env.toml")]);
        let path = resolve_config_path(Some(Path::new("/from/cli.toml")), lookup);
        assert_eq!(path, Some(PathBuf::from("/from/cli.toml")));
    }

    #[test]
    fn test_env_path_used_without_cli() {
        let path = resolve_config_path(None, vars(&[(CONFIG_ENV, "/from/env.toml")]));
        assert_eq!(path, Some(PathBuf::from("/from/env.toml")));
    }

    #[test]
    fn test_env_layer_maps_server_keys() {
        let lookup = vars(&[
            ("CV_LIFECYCLE_URL", "https://foreman"),
            ("CV_LIFECYCLE_TOKEN", "abc"),
            ("CV_LIFECYCLE_USER", ""),
        ]);
        let layer = env_layer(lookup).unwrap();

        assert_eq!(layer["server"]["url"], "https://foreman");
        assert_eq!(layer["server"]["token"], "abc");
        assert!(layer["server"].get("user").is_none());
    }

    #[test]
    fn test_env_layer_absent() {
        assert!(env_layer(vars(&[])).is_none());
    }
}
