//! Per-device storage
//!
//! Every paired device gets a directory
//! `<storage>/appletv-enhanced/<MAC without colons>/` holding its credentials and
//! the JSON state files.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use atv_discovery::paths::STORAGE_SUBDIR;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Files kept in a device directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFile {
    Credentials,
    Apps,
    Common,
    DeviceStates,
    MediaTypes,
    RemoteKeySwitches,
}

impl StorageFile {
    /// Every file except the credentials; deleting these resets the device
    pub const CONFIG_FILES: [StorageFile; 5] = [
        StorageFile::Apps,
        StorageFile::Common,
        StorageFile::DeviceStates,
        StorageFile::MediaTypes,
        StorageFile::RemoteKeySwitches,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            StorageFile::Credentials => "credentials.txt",
            StorageFile::Apps => "apps.json",
            StorageFile::Common => "common.json",
            StorageFile::DeviceStates => "deviceStates.json",
            StorageFile::MediaTypes => "mediaTypes.json",
            StorageFile::RemoteKeySwitches => "remoteKeySwitches.json",
        }
    }
}

/// User configuration of one app, keyed by bundle id in `apps.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub configured_name: String,
    #[serde(default)]
    pub is_configured: u8,
    #[serde(default)]
    pub visibility_state: u8,
    #[serde(default)]
    pub identifier: u64,
}

/// Contents of `apps.json`
pub type AppConfigs = BTreeMap<String, AppConfig>;

/// Contents of `common.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_identifier: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_avada_kedavra: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avada_kedavra_name: Option<String>,
}

/// Storage directory of one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStorage {
    dir: PathBuf,
}

impl DeviceStorage {
    pub fn new(storage_path: impl AsRef<Path>, mac: &str) -> Self {
        Self {
            dir: storage_path
                .as_ref()
                .join(STORAGE_SUBDIR)
                .join(mac.replace(':', "")),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: StorageFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    /// Create the device directory if needed
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Stored pairing credentials; `None` when the device is not paired yet
    pub fn credentials(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(StorageFile::Credentials)) {
            Ok(content) => {
                let content = content.trim();
                Ok((!content.is_empty()).then(|| content.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_credentials(&self, credentials: &str) -> Result<()> {
        self.ensure()?;
        std::fs::write(self.path(StorageFile::Credentials), credentials)?;
        Ok(())
    }

    /// `apps.json`, or `None` when it was never written
    pub fn apps(&self) -> Result<Option<AppConfigs>> {
        self.read_json(StorageFile::Apps)
    }

    pub fn save_apps(&self, apps: &AppConfigs) -> Result<()> {
        self.write_json(StorageFile::Apps, apps)
    }

    pub fn common(&self) -> Result<CommonConfig> {
        Ok(self.read_json(StorageFile::Common)?.unwrap_or_default())
    }

    pub fn save_common(&self, common: &CommonConfig) -> Result<()> {
        self.write_json(StorageFile::Common, common)
    }

    /// Delete every config file except the credentials.
    ///
    /// Missing files are skipped. Returns the files that were removed.
    pub fn reset(&self) -> Result<Vec<StorageFile>> {
        let mut removed = Vec::new();
        for file in StorageFile::CONFIG_FILES {
            match std::fs::remove_file(self.path(file)) {
                Ok(()) => removed.push(file),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!(dir = %self.dir.display(), removed = removed.len(), "Reset device storage");
        Ok(removed)
    }

    fn read_json<T: DeserializeOwned>(&self, file: StorageFile) -> Result<Option<T>> {
        match std::fs::read_to_string(self.path(file)) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_json<T: Serialize>(&self, file: StorageFile, value: &T) -> Result<()> {
        self.ensure()?;
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(self.path(file), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let storage = DeviceStorage::new("/data", "AA:BB:CC:DD:EE:FF");
        assert_eq!(storage.dir(), Path::new("/data/appletv-enhanced/AABBCCDDEEFF"));
        assert_eq!(
            storage.path(StorageFile::RemoteKeySwitches),
            PathBuf::from("/data/appletv-enhanced/AABBCCDDEEFF/remoteKeySwitches.json")
        );
    }

    #[test]
    fn test_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path(), "AA:BB");

        assert_eq!(storage.credentials().unwrap(), None);

        storage.save_credentials("secret\n").unwrap();
        assert_eq!(storage.credentials().unwrap(), Some("secret".to_string()));

        storage.save_credentials("").unwrap();
        assert_eq!(storage.credentials().unwrap(), None);
    }

    #[test]
    fn test_apps_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path(), "AA:BB");
        let mut apps = AppConfigs::new();
        apps.insert(
            "com.netflix.Netflix".to_string(),
            AppConfig {
                configured_name: "Netflix".to_string(),
                is_configured: 1,
                visibility_state: 0,
                identifier: 42,
            },
        );

        storage.save_apps(&apps).unwrap();

        let raw = std::fs::read_to_string(storage.path(StorageFile::Apps)).unwrap();
        assert!(raw.contains("\"configuredName\": \"Netflix\""));
        assert_eq!(storage.apps().unwrap(), Some(apps));
    }

    #[test]
    fn test_common_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path(), "AA:BB");

        assert_eq!(storage.common().unwrap(), CommonConfig::default());

        let common = CommonConfig {
            active_identifier: Some(7),
            ..Default::default()
        };
        storage.save_common(&common).unwrap();
        assert_eq!(storage.common().unwrap(), common);
    }

    #[test]
    fn test_reset_keeps_credentials_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path(), "AA:BB");
        storage.save_credentials("secret").unwrap();
        storage.save_apps(&AppConfigs::new()).unwrap();
        storage.save_common(&CommonConfig::default()).unwrap();

        let removed = storage.reset().unwrap();

        assert_eq!(removed, vec![StorageFile::Apps, StorageFile::Common]);
        assert_eq!(storage.credentials().unwrap(), Some("secret".to_string()));
        assert!(storage.reset().unwrap().is_empty());
    }
}
