//! Process manager - spawning

use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    child::ManagedChild,
    config::ProcessConfig,
    error::{ProcessError, Result},
};

/// Spawns managed processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessManager;

impl ProcessManager {
    /// Create new process manager
    pub fn new() -> Self {
        Self
    }

    /// Spawn a managed process
    ///
    /// Spawning is synchronous; it must be called from within a tokio runtime
    /// because the returned handle is driven by the runtime's reactor.
    ///
    /// # Examples
    /// ```no_run
    /// use atv_process::{ProcessManager, ProcessConfig};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = ProcessManager::new();
    /// let config = ProcessConfig::new("atvscript").args(["scan"]);
    /// let child = manager.spawn(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(&self, config: ProcessConfig) -> Result<ManagedChild> {
        if config.command.trim().is_empty() {
            return Err(ProcessError::InvalidConfig(
                "command must not be empty".to_string(),
            ));
        }

        debug!(command = %config.display_command(), "Spawning process");

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        if let Some(ref dir) = config.working_dir {
            cmd.current_dir(dir);
        }

        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        cmd.stdin(if config.pipe_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(if config.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stderr(if config.capture_stderr {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.kill_on_drop(config.kill_on_drop);

        let child = cmd.spawn().map_err(|source| ProcessError::SpawnFailed {
            command: config.command.clone(),
            source,
        })?;

        info!(pid = ?child.id(), command = %config.command, "Process spawned");

        Ok(ManagedChild::new(child, config))
    }

    /// Spawn a process and collect its complete stdout and stderr.
    ///
    /// Used for one-shot tools such as `atvscript scan`.
    pub async fn output(&self, config: ProcessConfig) -> Result<(std::process::ExitStatus, String, String)> {
        use tokio::io::AsyncReadExt;

        let mut child = self.spawn(config.pipe_stdin(false))?;
        let mut stdout = child.stdout();
        let mut stderr = child.stderr();

        // Invalid UTF-8 is replaced rather than failing the whole read
        let read_out = async {
            let mut buf = Vec::new();
            if let Some(ref mut out) = stdout {
                out.read_to_end(&mut buf).await?;
            }
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };
        let read_err = async {
            let mut buf = Vec::new();
            if let Some(ref mut err) = stderr {
                err.read_to_end(&mut buf).await?;
            }
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        let (out, err) = tokio::try_join!(read_out, read_err)?;
        let status = child.wait().await?;
        Ok((status, out, err))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_echo() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("echo").args(["hello"]);

        let child = manager.spawn(config).unwrap();
        assert!(child.pid() > 0);
    }

    #[tokio::test]
    async fn test_spawn_missing_executable() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("/nonexistent/atvremote-xyz");

        let result = manager.spawn(config);
        assert!(matches!(result, Err(ProcessError::SpawnFailed { .. })));
    }

    #[tokio::test]
    async fn test_spawn_empty_command() {
        let manager = ProcessManager::new();
        let result = manager.spawn(ProcessConfig::new("  "));
        assert!(matches!(result, Err(ProcessError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_output_collects_both_streams() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sh").args(["-c", "echo out; echo err 1>&2"]);

        let (status, stdout, stderr) = manager.output(config).await.unwrap();
        assert!(status.success());
        assert_eq!(stdout.trim(), "out");
        assert_eq!(stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_output_replaces_invalid_utf8() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sh").args(["-c", r"printf 'caf\351\n{}\n'"]);

        let (status, stdout, _) = manager.output(config).await.unwrap();
        assert!(status.success());
        assert_eq!(stdout, "caf\u{FFFD}\n{}\n");
    }
}
