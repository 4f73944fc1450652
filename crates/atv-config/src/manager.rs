//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::{BridgeConfig, ConfigManager as ConfigManagerTrait},
};

/// Prefix of environment overrides, e.g. `ATV_BRIDGE_LOG_LEVEL=debug`
pub const ENV_PREFIX: &str = "ATV_BRIDGE";

/// Configuration manager
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("atv-bridge")
            .join("config.toml")
    }
}

impl ConfigManagerTrait for ConfigManager {
    fn load_config(&mut self) -> Result<BridgeConfig> {
        debug!(path = %self.config_path.display(), "Loading configuration");

        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let bridge_config: BridgeConfig = config.try_deserialize()?;
        self.validate_config(&bridge_config)?;
        Ok(bridge_config)
    }

    fn save_config(&self, config: &BridgeConfig) -> Result<()> {
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    fn validate_config(&self, config: &BridgeConfig) -> Result<()> {
        if config.heartbeat_period_secs == 0 {
            return Err(ConfigError::Validation(
                "Heartbeat period must be greater than 0".to_string(),
            ));
        }
        if config.heartbeat_threshold_secs >= config.heartbeat_period_secs {
            return Err(ConfigError::Validation(format!(
                "Heartbeat threshold ({}s) must be shorter than the period ({}s)",
                config.heartbeat_threshold_secs, config.heartbeat_period_secs
            )));
        }
        if let Some(device) = config.devices.iter().find(|d| d.address.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Device {} has an empty address",
                device.name.as_deref().unwrap_or("<unnamed>")
            )));
        }
        config
            .discover
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
