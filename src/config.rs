//! Configuration management for sessionlog

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::{retention_days, ProcessRole, DEFAULT_RETENTION_DAYS};

const CONFIG_DIR_NAME: &str = "sessionlog";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Application name; the logs root is `{platform data dir}/{app_name}-logs`
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Sessions older than this many days are pruned and left out of archives (default: 7)
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Explicit logs root, overriding the platform location (`~` is expanded)
    #[serde(default)]
    pub logs_root: Option<String>,

    /// Process role used when a logger does not name one: "main", "renderer", ...
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_app_name() -> String {
    CONFIG_DIR_NAME.to_string()
}

fn default_retention_days() -> u64 {
    DEFAULT_RETENTION_DAYS
}

fn default_role() -> String {
    "main".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            retention_days: default_retention_days(),
            logs_root: None,
            role: default_role(),
        }
    }
}

impl Config {
    /// Load configuration from the default file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Directory that holds every session of this application
    pub fn logs_root(&self) -> PathBuf {
        match self.logs_root.as_deref() {
            Some(root) if !root.trim().is_empty() => {
                PathBuf::from(shellexpand::tilde(root).into_owned())
            }
            _ => platform_logs_dir().join(format!("{}-logs", self.app_name)),
        }
    }

    pub fn retention(&self) -> Duration {
        retention_days(self.retention_days)
    }

    pub fn role(&self) -> ProcessRole {
        self.role.parse().unwrap_or(ProcessRole::Main)
    }

    /// Path of the key-value store shared by all processes of the application
    pub fn store_path(&self) -> PathBuf {
        config_dir().join(format!("{}-state.json", self.app_name))
    }
}

/// Get the base configuration directory (`{config dir}/sessionlog`)
/// Falls back to ./.sessionlog if the platform config directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine config directory, using current directory");
        PathBuf::from(format!(".{}", CONFIG_DIR_NAME))
    })
}

/// Try to get the base configuration directory, returning None if unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Platform directory under which `{app}-logs` lives
/// Falls back to the current directory
pub fn platform_logs_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine data directory, using current directory for logs");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_name, "sessionlog");
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.role(), ProcessRole::Main);
        assert_eq!(config.retention(), Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            retention_days: 14,
            logs_root: Some("/var/log/app".to_string()),
            ..Config::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let parsed: Config = toml::from_str("app_name = \"notes\"").unwrap();
        assert_eq!(parsed.app_name, "notes");
        assert_eq!(parsed.retention_days, 7);
        assert_eq!(parsed.role, "main");
        assert!(parsed.logs_root.is_none());
    }

    #[test]
    fn test_logs_root_defaults_to_app_name() {
        let config = Config {
            app_name: "notes".to_string(),
            ..Config::default()
        };
        assert!(config.logs_root().ends_with("notes-logs"));
    }

    #[test]
    fn test_logs_root_override_expands_tilde() {
        let config = Config {
            logs_root: Some("~/app-logs".to_string()),
            ..Config::default()
        };
        let root = config.logs_root();
        assert!(root.ends_with("app-logs"));
        if dirs::home_dir().is_some() {
            assert!(!root.starts_with("~"));
        }
    }

    #[test]
    fn test_role_parse() {
        let config = Config {
            role: "renderer".to_string(),
            ..Config::default()
        };
        assert_eq!(config.role(), ProcessRole::Renderer);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let config = Config {
            app_name: "notes".to_string(),
            retention_days: 3,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "retention_days = \"soon\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with("sessionlog") || dir.ends_with(".sessionlog"));
    }
}
