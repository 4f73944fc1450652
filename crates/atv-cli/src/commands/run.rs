// Supervised interactive session with reconnection

use std::time::Duration;

use atv_config::{InputBugOutcome, InputBugSolver};
use atv_remote::{Command as RemoteCommand, RemoteSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{AppContext, Command};
use crate::error::CliResult;
use crate::output;

/// First delay before reconnecting
const RECONNECT_BASE: Duration = Duration::from_secs(5);

/// Upper bound for the reconnect delay
const RECONNECT_MAX: Duration = Duration::from_secs(60);

/// A session that stayed up this long resets the backoff
const STABLE_SESSION: Duration = Duration::from_secs(60);

/// Delay before reconnect attempt number `attempt` (0-based)
pub fn reconnect_delay(attempt: u32) -> Duration {
    RECONNECT_BASE
        .saturating_mul(2u32.saturating_pow(attempt.min(16)))
        .min(RECONNECT_MAX)
}

/// What to do with one line typed on stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Ignore,
    Send(RemoteCommand),
    Reset,
    Quit,
}

impl InputAction {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => InputAction::Ignore,
            "reset" | "avada_kedavra" => InputAction::Reset,
            "quit" | "exit" => InputAction::Quit,
            other => InputAction::Send(RemoteCommand::parse(other)),
        }
    }
}

enum SessionEnd {
    Dropped,
    Stop,
}

/// Keep a session to one device open until interrupted.
///
/// Commands are read from stdin, one per line. `reset` fires the reset gesture
/// and `quit` ends the run.
pub struct RunCommand {
    context: AppContext,
    target: String,
}

impl RunCommand {
    pub fn new(context: AppContext, target: String) -> Self {
        Self { context, target }
    }
}

#[async_trait::async_trait]
impl Command for RunCommand {
    async fn execute(&self) -> CliResult<()> {
        let target = self.context.resolve(&self.target)?;
        let logger = self.context.device_logger(&target.label);

        if let Some(storage) = &target.storage {
            match InputBugSolver::new(storage, logger.clone()).run()? {
                InputBugOutcome::Reset {
                    percentage,
                    name,
                    removed,
                } => {
                    output::print_warning(&format!(
                        "{}% of apps were named {:?}; reset {} stored file(s)",
                        percentage,
                        name,
                        removed.len()
                    ));
                }
                outcome => debug!(?outcome, "Input bug check finished"),
            }
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut attempt = 0u32;
        output::print_info("Type a command per line (`reset` closes all apps, `quit` exits)");

        loop {
            let started = Instant::now();
            let end = match RemoteSession::connect(target.session.clone(), logger.clone()) {
                Ok(session) => {
                    session.on_home(|| info!(target: "atv_bridge", "Home pressed"));
                    let end = drive(&session, &mut lines).await?;
                    session.disconnect();
                    session.closed().await;
                    end
                }
                Err(e) => {
                    warn!(device = %target.label, error = %e, "Failed to start atvremote");
                    SessionEnd::Dropped
                }
            };

            if let SessionEnd::Stop = end {
                return Ok(());
            }

            if started.elapsed() >= STABLE_SESSION {
                attempt = 0;
            }
            let delay = reconnect_delay(attempt);
            attempt = attempt.saturating_add(1);
            info!(device = %target.label, delay_secs = delay.as_secs(), "Reconnecting");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = tokio::signal::ctrl_c() => return Ok(()),
            }
        }
    }
}

async fn drive<R>(
    session: &RemoteSession,
    lines: &mut tokio::io::Lines<R>,
) -> CliResult<SessionEnd>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        tokio::select! {
            _ = session.closed() => return Ok(SessionEnd::Dropped),
            _ = tokio::signal::ctrl_c() => return Ok(SessionEnd::Stop),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(SessionEnd::Stop);
                };
                let result = match InputAction::parse(&line) {
                    InputAction::Ignore => Ok(()),
                    InputAction::Send(command) => session.send_command(command, false),
                    InputAction::Reset => session.avada_kedavra(),
                    InputAction::Quit => return Ok(SessionEnd::Stop),
                };
                if let Err(e) = result {
                    output::print_warning(&format!("Command not sent: {}", e));
                }
            }
        }
    }
}
