//! Managed child process wrapper

use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Child;
use tracing::{debug, warn};

use crate::{
    config::ProcessConfig,
    error::{ProcessError, Result},
};

/// How long [`ManagedChild::shutdown`] waits for the child after killing it
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Wrapper around tokio::process::Child with lifecycle management
#[derive(Debug)]
pub struct ManagedChild {
    /// Underlying tokio child process
    child: Child,
    /// Process configuration
    config: ProcessConfig,
    /// Process ID
    pid: u32,
}

impl ManagedChild {
    /// Create new managed child
    pub(crate) fn new(child: Child, config: ProcessConfig) -> Self {
        let pid = child.id().unwrap_or(0);
        Self { child, config, pid }
    }

    /// Get process ID
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Get process configuration
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Check if process is still running
    pub fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(_) => false,
        }
    }

    /// Wait for process to exit
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.child.wait())
                .await
                .map_err(|_| ProcessError::Timeout {
                    seconds: timeout.as_secs(),
                })?
                .map_err(Into::into),
            None => self.child.wait().await.map_err(Into::into),
        }
    }

    /// Send a kill signal without waiting for the process to exit.
    ///
    /// Killing a process that already exited is not an error.
    pub fn start_kill(&mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        debug!(pid = %self.pid, "Killing process");
        self.child
            .start_kill()
            .map_err(|e| ProcessError::KillFailed(e.to_string()))
    }

    /// Kill the process and wait for it to exit
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        debug!(pid = %self.pid, "Shutting down process");

        if let Err(e) = self.child.kill().await {
            warn!(pid = %self.pid, error = %e, "Failed to kill process");
            return Err(ProcessError::KillFailed(e.to_string()));
        }

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.child.wait()).await {
            Ok(Ok(_)) => {
                debug!(pid = %self.pid, "Process shut down");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(pid = %self.pid, error = %e, "Error waiting for process");
                Err(ProcessError::KillFailed(e.to_string()))
            }
            Err(_) => {
                warn!(pid = %self.pid, "Timeout waiting for process to exit");
                Err(ProcessError::Timeout {
                    seconds: SHUTDOWN_TIMEOUT.as_secs(),
                })
            }
        }
    }

    /// Take stdin handle
    pub fn stdin(&mut self) -> Option<tokio::process::ChildStdin> {
        self.child.stdin.take()
    }

    /// Take stdout handle
    pub fn stdout(&mut self) -> Option<tokio::process::ChildStdout> {
        self.child.stdout.take()
    }

    /// Take stderr handle
    pub fn stderr(&mut self) -> Option<tokio::process::ChildStderr> {
        self.child.stderr.take()
    }
}
