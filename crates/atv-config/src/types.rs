//! Core configuration types

use std::path::PathBuf;
use std::time::Duration;

use atv_discovery::DiscoverySettings;
use atv_remote::{HeartbeatPolicy, LogLevel, StderrPolicy, DEFAULT_RESET_APP_COUNT};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Root of the bridge's data; device directories live below it
    pub storage_path: PathBuf,
    pub log_level: LogLevel,
    /// `atvremote` executable; derived from the storage path when unset
    pub atvremote_path: Option<PathBuf>,
    /// `atvscript` executable; derived from the storage path when unset
    pub atvscript_path: Option<PathBuf>,
    pub discover: DiscoverySettings,
    /// Apps swiped away by the reset gesture
    pub avada_kedavra_app_amount: usize,
    pub heartbeat_period_secs: u64,
    pub heartbeat_threshold_secs: u64,
    pub stderr_policy: StderrPolicy,
    /// Devices addressed directly, without discovery
    pub devices: Vec<DeviceConfig>,
}

/// A device known by address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeviceConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub address: String,
    /// MAC address; selects the storage directory and is passed as `--id`
    #[serde(default)]
    pub mac: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let heartbeat = HeartbeatPolicy::default();
        Self {
            storage_path: default_storage_path(),
            log_level: LogLevel::Info,
            atvremote_path: None,
            atvscript_path: None,
            discover: DiscoverySettings::default(),
            avada_kedavra_app_amount: DEFAULT_RESET_APP_COUNT,
            heartbeat_period_secs: heartbeat.period.as_secs(),
            heartbeat_threshold_secs: heartbeat.threshold.as_secs(),
            stderr_policy: StderrPolicy::Strict,
            devices: Vec::new(),
        }
    }
}

impl BridgeConfig {
    pub fn heartbeat_policy(&self) -> HeartbeatPolicy {
        HeartbeatPolicy::new(
            Duration::from_secs(self.heartbeat_period_secs),
            Duration::from_secs(self.heartbeat_threshold_secs),
        )
    }

    /// Configured level, forced to debug by a non-`false` `DEBUG` variable
    pub fn effective_log_level(&self) -> LogLevel {
        LogLevel::from_debug_env().unwrap_or(self.log_level)
    }

    /// Look up a configured device by name, address or MAC
    pub fn device(&self, key: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|device| {
            device.address == key
                || device.name.as_deref() == Some(key)
                || device
                    .mac
                    .as_deref()
                    .map(|mac| mac.eq_ignore_ascii_case(key))
                    .unwrap_or(false)
        })
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atv-bridge")
}

/// Configuration manager trait
pub trait ConfigManager {
    /// Load configuration
    fn load_config(&mut self) -> Result<BridgeConfig, ConfigError>;
    /// Save configuration
    fn save_config(&self, config: &BridgeConfig) -> Result<(), ConfigError>;
    /// Validate configuration
    fn validate_config(&self, config: &BridgeConfig) -> Result<(), ConfigError>;
}
