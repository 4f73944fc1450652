//! atv-bridge configuration
//!
//! - [`BridgeConfig`]: settings loaded from a TOML file and `ATV_BRIDGE_*`
//!   environment variables by [`ConfigManager`]
//! - [`DeviceStorage`]: the per-device directory holding pairing credentials
//!   and the JSON state files
//! - [`InputBugSolver`]: detects and resets app lists corrupted by the tvOS 18
//!   input naming bug

pub mod error;
pub mod input_bug;
pub mod manager;
pub mod storage;
pub mod types;

pub use error::{ConfigError, Result};
pub use input_bug::{InputBugOutcome, InputBugSolver};
pub use manager::ConfigManager;
pub use storage::{AppConfig, AppConfigs, CommonConfig, DeviceStorage, StorageFile};
pub use types::{BridgeConfig, ConfigManager as ConfigManagerTrait, DeviceConfig};
