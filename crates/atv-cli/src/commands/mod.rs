// Command handlers for atv-bridge

pub mod config;
pub mod reset;
pub mod run;
pub mod scan;
pub mod send;

pub use config::ConfigCommand;
pub use reset::ResetCommand;
pub use run::RunCommand;
pub use scan::ScanCommand;
pub use send::SendCommand;

use std::sync::Arc;

use atv_config::{BridgeConfig, DeviceStorage};
use atv_discovery::PyatvPaths;
use atv_remote::{LevelLogger, Logger, PrefixLogger, SessionConfig, TracingLogger};

use crate::error::{CliError, CliResult};

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}

/// Everything a command needs from the environment
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: BridgeConfig,
}

/// A device resolved from a command-line target
#[derive(Debug, Clone)]
pub struct Target {
    /// Name used to prefix log messages
    pub label: String,
    pub session: SessionConfig,
    /// Storage directory, known only for devices with a MAC
    pub storage: Option<DeviceStorage>,
}

impl AppContext {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn pyatv_paths(&self) -> PyatvPaths {
        let detected = PyatvPaths::detect(&self.config.storage_path);
        PyatvPaths {
            atvremote: self
                .config
                .atvremote_path
                .clone()
                .unwrap_or(detected.atvremote),
            atvscript: self
                .config
                .atvscript_path
                .clone()
                .unwrap_or(detected.atvscript),
        }
    }

    /// Resolve `target` (configured name, address or MAC, or a bare address)
    /// into session parameters, reading stored credentials when the MAC is known.
    pub fn resolve(&self, target: &str) -> CliResult<Target> {
        if target.trim().is_empty() {
            return Err(CliError::InvalidArgument {
                message: "target must not be empty".to_string(),
            });
        }

        let device = self.config.device(target);
        let address = device
            .map(|d| d.address.clone())
            .unwrap_or_else(|| target.to_string());
        let mac = device.and_then(|d| d.mac.clone());
        let label = device
            .and_then(|d| d.name.clone())
            .unwrap_or_else(|| address.clone());

        let storage = mac
            .as_deref()
            .map(|mac| DeviceStorage::new(&self.config.storage_path, mac));
        // Pairing stores one credential string used for both protocols
        let credentials = match &storage {
            Some(storage) => storage.credentials()?.unwrap_or_default(),
            None => String::new(),
        };

        let mut session = SessionConfig::new(address)
            .with_atvremote_path(self.pyatv_paths().atvremote.to_string_lossy())
            .with_credentials(credentials.clone(), credentials)
            .with_heartbeat(self.config.heartbeat_policy())
            .with_stderr_policy(self.config.stderr_policy)
            .with_reset_app_count(self.config.avada_kedavra_app_amount);
        if let Some(mac) = mac {
            session = session.with_device_id(mac);
        }

        Ok(Target {
            label,
            session,
            storage,
        })
    }

    /// Operator logger for one device: `[I] <label>: <message>`
    pub fn device_logger(&self, label: &str) -> Arc<dyn Logger> {
        let level: Arc<dyn Logger> = Arc::new(LevelLogger::new(
            Arc::new(TracingLogger),
            self.config.log_level,
        ));
        Arc::new(PrefixLogger::new(level, label))
    }
}
