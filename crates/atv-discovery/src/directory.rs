//! Cached view of the devices on the network

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::scanner::DeviceScanner;
use crate::types::{DeviceInfo, DiscoverySettings, ScanOptions};

/// Runs scans and remembers every device seen, keyed by upper-case MAC.
///
/// Owned by whoever drives discovery; there is no process-wide instance.
pub struct DeviceDirectory<S: DeviceScanner> {
    scanner: S,
    cache: RwLock<HashMap<String, DeviceInfo>>,
}

impl<S: DeviceScanner> DeviceDirectory<S> {
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Scan according to `settings` and return the usable Apple TVs.
    ///
    /// A failing scan mode is logged and skipped; the call only fails when every
    /// enabled mode failed. Devices without a MAC, non Apple TV models and
    /// blacklisted devices are left out. Each device appears once.
    pub async fn discover(&self, settings: &DiscoverySettings) -> Result<Vec<DeviceInfo>> {
        settings.validate()?;

        let mut scans = Vec::new();
        if settings.multicast {
            scans.push(("multicast", ScanOptions::multicast()));
        }
        if !settings.unicast.is_empty() {
            scans.push(("unicast", ScanOptions::unicast(settings.unicast.clone())));
        }

        let mut found = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0;
        for (mode, options) in scans {
            match self.scanner.scan(&options).await {
                Ok(devices) => {
                    debug!(mode, count = devices.len(), "Finished device discovery");
                    succeeded += 1;
                    found.extend(devices);
                }
                Err(e) => {
                    error!(mode, error = %e, "Device discovery failed");
                    last_error = Some(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        self.remember(&found);

        let mut seen = Vec::new();
        let mut apple_tvs = Vec::new();
        for device in found.into_iter().filter(DeviceInfo::is_apple_tv) {
            let Some(mac) = device.normalized_mac() else {
                debug!(name = %device.name, address = %device.address, "Skipping device without MAC address");
                continue;
            };
            if settings.is_blacklisted(&device) {
                debug!(name = %device.name, %mac, "Device is on the blacklist, skipping");
                continue;
            }
            if seen.contains(&mac) {
                continue;
            }
            info!(name = %device.name, %mac, address = %device.address, "Found Apple TV");
            seen.push(mac);
            apple_tvs.push(device);
        }

        Ok(apple_tvs)
    }

    /// A previously discovered device by MAC, in any case
    pub fn device(&self, mac: &str) -> Option<DeviceInfo> {
        self.cache.read().get(&mac.to_uppercase()).cloned()
    }

    /// Every device seen so far, including ones filtered out of `discover`
    pub fn cached(&self) -> Vec<DeviceInfo> {
        self.cache.read().values().cloned().collect()
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    fn remember(&self, devices: &[DeviceInfo]) {
        let mut cache = self.cache.write();
        for device in devices {
            if let Some(mac) = device.normalized_mac() {
                cache.insert(mac, device.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Returns canned results per scan mode and records each request
    #[derive(Default)]
    struct FakeScanner {
        multicast: Vec<DeviceInfo>,
        unicast: Vec<DeviceInfo>,
        fail_multicast: bool,
        requests: Mutex<Vec<ScanOptions>>,
    }

    #[async_trait]
    impl DeviceScanner for FakeScanner {
        async fn scan(&self, options: &ScanOptions) -> Result<Vec<DeviceInfo>> {
            self.requests.lock().push(options.clone());
            if options.hosts.is_empty() {
                if self.fail_multicast {
                    return Err(DiscoveryError::Scan("multicast blocked".to_string()));
                }
                Ok(self.multicast.clone())
            } else {
                Ok(self.unicast.clone())
            }
        }
    }

    fn device(name: &str, model: &str, mac: Option<&str>, address: &str) -> DeviceInfo {
        DeviceInfo {
            name: name.to_string(),
            address: address.to_string(),
            identifier: mac.map(str::to_string),
            mac: mac.map(str::to_string),
            model: Some(model.to_string()),
            model_name: None,
            os: None,
            version: None,
        }
    }

    #[tokio::test]
    async fn test_filters_models_missing_mac_and_blacklist() {
        let scanner = FakeScanner {
            multicast: vec![
                device("Living Room", "Gen4K", Some("aa:bb:cc:dd:ee:01"), "10.0.0.5"),
                device("Bedroom", "AppleTV4KGen2", Some("AA:BB:CC:DD:EE:02"), "10.0.0.6"),
                device("Speaker", "HomePod", Some("AA:BB:CC:DD:EE:03"), "10.0.0.7"),
                device("Mystery", "Gen4", None, "10.0.0.8"),
                device("Office", "Gen4K", Some("AA:BB:CC:DD:EE:04"), "10.0.0.9"),
            ],
            ..Default::default()
        };
        let directory = DeviceDirectory::new(scanner);
        let settings = DiscoverySettings {
            blacklist: vec!["AA:BB:CC:DD:EE:02".to_string(), "10.0.0.9".to_string()],
            ..Default::default()
        };

        let found = directory.discover(&settings).await.unwrap();

        let names: Vec<_> = found.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Living Room"]);
        // Filtered devices are still remembered
        assert!(directory.device("aa:bb:cc:dd:ee:03").is_some());
        assert_eq!(directory.cached().len(), 4);
    }

    #[tokio::test]
    async fn test_runs_both_modes_and_dedupes() {
        let tv = device("Living Room", "Gen4K", Some("AA:BB:CC:DD:EE:01"), "10.0.0.5");
        let scanner = FakeScanner {
            multicast: vec![tv.clone()],
            unicast: vec![tv],
            ..Default::default()
        };
        let directory = DeviceDirectory::new(scanner);
        let settings = DiscoverySettings {
            unicast: vec!["10.0.0.5".to_string()],
            ..Default::default()
        };

        let found = directory.discover(&settings).await.unwrap();

        assert_eq!(found.len(), 1);
        let requests = directory.scanner().requests.lock().clone();
        assert_eq!(
            requests,
            vec![
                ScanOptions::multicast(),
                ScanOptions::unicast(vec!["10.0.0.5".to_string()])
            ]
        );
    }

    #[tokio::test]
    async fn test_one_failing_mode_is_tolerated() {
        let scanner = FakeScanner {
            unicast: vec![device("Living Room", "Gen4K", Some("AA:BB:CC:DD:EE:01"), "10.0.0.5")],
            fail_multicast: true,
            ..Default::default()
        };
        let directory = DeviceDirectory::new(scanner);
        let settings = DiscoverySettings {
            unicast: vec!["10.0.0.5".to_string()],
            ..Default::default()
        };

        assert_eq!(directory.discover(&settings).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_all_modes_failing_is_an_error() {
        let scanner = FakeScanner {
            fail_multicast: true,
            ..Default::default()
        };
        let directory = DeviceDirectory::new(scanner);

        let result = directory.discover(&DiscoverySettings::default()).await;

        assert!(matches!(result, Err(DiscoveryError::Scan(_))));
    }

    #[tokio::test]
    async fn test_invalid_settings_do_not_scan() {
        let directory = DeviceDirectory::new(FakeScanner::default());
        let settings = DiscoverySettings {
            multicast: false,
            ..Default::default()
        };

        assert!(matches!(
            directory.discover(&settings).await,
            Err(DiscoveryError::InvalidSettings(_))
        ));
        assert!(directory.scanner().requests.lock().is_empty());
    }
}
