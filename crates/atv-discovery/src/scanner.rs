//! Device scanners

use std::time::Duration;

use async_trait::async_trait;
use atv_process::{ProcessConfig, ProcessError, ProcessManager};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DiscoveryError, Result};
use crate::types::{DeviceInfo, ScanOptions};

/// Upper bound for a single `atvscript scan`
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Finds devices on the network
#[async_trait]
pub trait DeviceScanner: Send + Sync {
    async fn scan(&self, options: &ScanOptions) -> Result<Vec<DeviceInfo>>;
}

/// Scanner backed by `atvscript`
#[derive(Debug, Clone)]
pub struct AtvScriptScanner {
    atvscript: String,
    timeout: Duration,
    manager: ProcessManager,
}

impl AtvScriptScanner {
    pub fn new(atvscript: impl Into<String>) -> Self {
        Self {
            atvscript: atvscript.into(),
            timeout: DEFAULT_SCAN_TIMEOUT,
            manager: ProcessManager::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `[--scan-hosts h1,h2] scan`
    pub fn args(options: &ScanOptions) -> Vec<String> {
        let mut args = Vec::new();
        if !options.hosts.is_empty() {
            args.push("--scan-hosts".to_string());
            args.push(options.hosts.join(","));
        }
        args.push("scan".to_string());
        args
    }
}

#[async_trait]
impl DeviceScanner for AtvScriptScanner {
    async fn scan(&self, options: &ScanOptions) -> Result<Vec<DeviceInfo>> {
        let config = ProcessConfig::new(&self.atvscript)
            .args(Self::args(options))
            .kill_on_drop(true);

        debug!(hosts = ?options.hosts, "Running atvscript scan");
        let (status, stdout, stderr) = tokio::time::timeout(self.timeout, self.manager.output(config))
            .await
            .map_err(|_| ProcessError::Timeout {
                seconds: self.timeout.as_secs(),
            })??;

        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "atvscript wrote to stderr");
        }
        if !status.success() && stdout.trim().is_empty() {
            return Err(DiscoveryError::Scan(format!(
                "atvscript exited with {}: {}",
                status,
                stderr.trim()
            )));
        }

        let devices = parse_scan_output(&stdout)?;
        debug!(count = devices.len(), "atvscript scan finished");
        Ok(devices)
    }
}

#[derive(Debug, Deserialize)]
struct ScanReport {
    result: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    devices: Vec<ScannedDevice>,
}

#[derive(Debug, Deserialize)]
struct ScannedDevice {
    name: String,
    address: String,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    device_info: ScannedDeviceInfo,
}

#[derive(Debug, Default, Deserialize)]
struct ScannedDeviceInfo {
    #[serde(default)]
    mac: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    model_str: Option<String>,
    #[serde(default)]
    operating_system: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Parse the JSON report printed by `atvscript scan`
pub fn parse_scan_output(output: &str) -> Result<Vec<DeviceInfo>> {
    let report: ScanReport = serde_json::from_str(output.trim())?;

    if report.result != "success" {
        return Err(DiscoveryError::Scan(
            report.error.unwrap_or_else(|| format!("result was {}", report.result)),
        ));
    }

    Ok(report
        .devices
        .into_iter()
        .map(|device| DeviceInfo {
            name: device.name,
            address: device.address,
            identifier: device.identifier,
            mac: device.device_info.mac,
            model: device.device_info.model,
            model_name: device.device_info.model_str,
            os: device.device_info.operating_system,
            version: device.device_info.version,
        })
        .collect())
}
