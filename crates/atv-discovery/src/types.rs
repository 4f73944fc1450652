//! Discovery data types

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

/// Models reported by pyatv that the bridge can drive
pub const APPLE_TV_MODELS: [&str; 6] = [
    "Gen4",
    "Gen4K",
    "AppleTVGen4",
    "AppleTVGen4K",
    "AppleTV4KGen2",
    "AppleTV4KGen3",
];

/// A device found by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    /// Network address, usually an IPv4 address
    pub address: String,
    /// pyatv's primary identifier
    pub identifier: Option<String>,
    pub mac: Option<String>,
    pub model: Option<String>,
    /// Human readable model, e.g. "Apple TV 4K (gen 2)"
    pub model_name: Option<String>,
    pub os: Option<String>,
    pub version: Option<String>,
}

impl DeviceInfo {
    /// Whether the model is one of [`APPLE_TV_MODELS`]
    pub fn is_apple_tv(&self) -> bool {
        self.model
            .as_deref()
            .map(|model| APPLE_TV_MODELS.contains(&model))
            .unwrap_or(false)
    }

    /// MAC address in upper case, the key devices are cached under
    pub fn normalized_mac(&self) -> Option<String> {
        self.mac.as_ref().map(|mac| mac.to_uppercase())
    }
}

/// Options for a single scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Hosts to probe directly; empty means multicast
    pub hosts: Vec<String>,
}

impl ScanOptions {
    pub fn multicast() -> Self {
        Self::default()
    }

    pub fn unicast(hosts: Vec<String>) -> Self {
        Self { hosts }
    }
}

fn default_multicast() -> bool {
    true
}

/// Which scans to run and which devices to ignore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_multicast")]
    pub multicast: bool,
    /// Hosts probed with a unicast scan
    #[serde(default)]
    pub unicast: Vec<String>,
    /// MAC addresses (any case) or hosts to skip
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            multicast: true,
            unicast: Vec::new(),
            blacklist: Vec::new(),
        }
    }
}

impl DiscoverySettings {
    /// Reject settings that disable both scan modes
    pub fn validate(&self) -> Result<()> {
        if !self.multicast && self.unicast.is_empty() {
            return Err(DiscoveryError::InvalidSettings(
                "Neither multicast nor unicast discovery is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `device` matches a blacklist entry by MAC or host
    pub fn is_blacklisted(&self, device: &DeviceInfo) -> bool {
        let mac = device.normalized_mac();
        self.blacklist.iter().any(|entry| {
            mac.as_deref() == Some(entry.to_uppercase().as_str()) || *entry == device.address
        })
    }
}
