//! Error types for device discovery

use atv_process::ProcessError;
use thiserror::Error;

/// Errors that can occur during discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Running `atvscript` failed
    #[error("atvscript process error: {0}")]
    Process(#[from] ProcessError),

    /// `atvscript` ran but reported a failure
    #[error("Scan failed: {0}")]
    Scan(String),

    /// The scan report was not valid JSON
    #[error("Failed to parse scan output: {0}")]
    Parse(#[from] serde_json::Error),

    /// Discovery settings cannot produce any scan
    #[error("Invalid discovery settings: {0}")]
    InvalidSettings(String),
}

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;
