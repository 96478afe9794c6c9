//! # Application Configuration
//!
//! Loads the optional `config.toml` from the platform configuration directory
//! (`~/.config/statusboard/config.toml` on Linux). The file is written with
//! default values on first start so there is always something to edit.
//!
//! Configuration never prevents startup: a missing file, missing fields, an
//! unreadable file or blank broker settings all fall back to defaults, the
//! last two with a warning.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::mqtt::config::MqttConfig;

const CONFIG_DIR: &str = "statusboard";
const CONFIG_FILE: &str = "config.toml";

/// Top level of `config.toml`
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub mqtt: MqttConfig,
    pub ui: UiConfig,
}

/// Window and rendering settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Window title
    pub title: String,
    /// Start the window fullscreen
    pub fullscreen: bool,
    /// Interval between repaints while idle, in milliseconds
    pub repaint_ms: u64,
    /// Number of labels in the status column
    pub label_count: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Statusboard".to_owned(),
            fullscreen: true,
            repaint_ms: 33,
            label_count: 5,
        }
    }
}

impl AppConfig {
    /// Path of the config file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the config from the default location, writing defaults if absent.
    pub async fn load_or_default() -> AppConfig {
        let Some(path) = Self::default_path() else {
            warn!("No configuration directory available, using defaults");
            return AppConfig::default();
        };

        if let Err(e) = Self::ensure_default_config(&path).await {
            warn!("Could not write default config: {}", e);
        }

        match Self::load_from(&path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("{}, using defaults", e);
                AppConfig::default()
            }
        }
    }

    /// Reads, parses and validates the config file at `path`.
    pub async fn load_from(path: &Path) -> Result<AppConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
        config
            .mqtt
            .validate()
            .map_err(|e| eyre!("Rejected config file {}: {}", path.display(), e))?;
        info!("Loaded configuration from {}", path.display());
        debug!("{:?}", config);
        Ok(config)
    }

    /// Writes a default config to `path` unless a file already exists there.
    pub async fn ensure_default_config(path: &Path) -> Result<()> {
        if tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check for config file: {}", e))?
        {
            return Ok(());
        }

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        let content = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write default config: {}", e))?;

        info!("Wrote default configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn defaults_point_at_local_broker() {
        let config = AppConfig::default();
        assert_eq!(config.mqtt.host, "localhost");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.topic, "topic/state");
        assert_eq!(config.mqtt.to_string(), "localhost:1883");
        assert_eq!(config.ui.label_count, 5);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() -> TestResult {
        let config: AppConfig = toml::from_str(
            r#"
            [mqtt]
            host = "broker.lan"

            [ui]
            fullscreen = false
            "#,
        )?;

        assert_eq!(config.mqtt.host, "broker.lan");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.topic, "topic/state");
        assert!(!config.ui.fullscreen);
        assert_eq!(config.ui.repaint_ms, 33);
        Ok(())
    }

    #[test]
    fn empty_file_is_default() -> TestResult {
        let config: AppConfig = toml::from_str("")?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[tokio::test]
    async fn default_file_is_written_once_and_reloads() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);

        AppConfig::ensure_default_config(&path).await?;
        assert_eq!(AppConfig::load_from(&path).await?, AppConfig::default());

        tokio::fs::write(&path, "[mqtt]\nport = 1884\n").await?;
        AppConfig::ensure_default_config(&path).await?;
        assert_eq!(AppConfig::load_from(&path).await?.mqtt.port, 1884);
        Ok(())
    }

    #[tokio::test]
    async fn blank_broker_host_is_rejected_at_load() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        tokio::fs::write(&path, "[mqtt]\nhost = \"\"\n").await?;

        let err = AppConfig::load_from(&path).await.unwrap_err();
        assert!(err.to_string().contains("broker host must not be empty"));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        tokio::fs::write(&path, "[mqtt\nport = ").await?;

        assert!(AppConfig::load_from(&path).await.is_err());
        Ok(())
    }
}
