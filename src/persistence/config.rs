use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// User configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the task server, without the API path
    pub server_url: String,
    pub api_path: String,
    /// Auto-refresh period
    pub refresh_secs: u64,
    /// Quiet time before filter edits are applied
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub use_emoji: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8888".to_string(),
            api_path: "/task/api".to_string(),
            refresh_secs: 30,
            debounce_ms: 300,
            request_timeout_secs: 10,
            use_emoji: false,
        }
    }
}

impl Config {
    /// Full URL of the task endpoint
    pub fn endpoint(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let path = self.api_path.trim();
        if path.is_empty() {
            return base.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

/// Load config from config.json, defaults when the file doesn't exist
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

/// Save config to config.json
pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::persistence::atomic_write(path, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = tempdir().unwrap();
        let config = load_config(temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.endpoint(), "http://127.0.0.1:8888/task/api");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"server_url":"https://tasks.example.com/","refresh_secs":60}"#)
            .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.refresh_secs, 60);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.endpoint(), "https://tasks.example.com/task/api");
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");

        let config = Config {
            api_path: "api/tasks".to_string(),
            use_emoji: true,
            ..Config::default()
        };
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.endpoint(), "http://127.0.0.1:8888/api/tasks");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_config(&path).is_err());
    }
}
