//! # atv-process
//!
//! **Purpose**: Child process lifecycle for the `atvremote` / `atvscript` tools
//!
//! Every interaction with an Apple TV goes through a pyatv command-line tool, either
//! as a long-lived interactive session or as a one-shot invocation. This crate owns
//! the mechanics shared by both: building the command line, piping stdio, tracking
//! the PID, and killing or reaping the child.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atv_process::{ProcessConfig, ProcessManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ProcessManager::new();
//!
//! let config = ProcessConfig::new("atvremote")
//!     .args(["--scan-hosts", "10.0.0.20", "cli"])
//!     .kill_on_drop(true);
//!
//! let mut child = manager.spawn(config)?;
//! child.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod child;
pub mod config;
pub mod error;
pub mod manager;

pub use child::ManagedChild;
pub use config::ProcessConfig;
pub use error::{ProcessError, Result};
pub use manager::ProcessManager;
