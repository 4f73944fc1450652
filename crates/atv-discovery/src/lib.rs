//! Apple TV discovery
//!
//! Devices are found by running `atvscript scan` (multicast) or
//! `atvscript --scan-hosts <hosts> scan` (unicast) and parsing its JSON report.
//! [`DeviceDirectory`] combines both scan modes, remembers every device it has
//! seen by MAC address and filters the results down to usable Apple TVs.

pub mod directory;
pub mod error;
pub mod paths;
pub mod scanner;
pub mod types;

pub use directory::DeviceDirectory;
pub use error::{DiscoveryError, Result};
pub use paths::PyatvPaths;
pub use scanner::{parse_scan_output, AtvScriptScanner, DeviceScanner};
pub use types::{DeviceInfo, DiscoverySettings, ScanOptions, APPLE_TV_MODELS};
