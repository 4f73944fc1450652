// Send commands to a device

use std::time::Duration;

use atv_remote::{Command as RemoteCommand, RemoteSession};
use tracing::debug;

use super::{AppContext, Command};
use crate::error::CliResult;
use crate::output;

/// Connect, send commands in order, then disconnect
pub struct SendCommand {
    context: AppContext,
    target: String,
    commands: Vec<String>,
    wait: Duration,
}

impl SendCommand {
    pub fn new(context: AppContext, target: String, commands: Vec<String>) -> Self {
        Self {
            context,
            target,
            commands,
            wait: Duration::from_millis(1000),
        }
    }

    pub fn with_wait_ms(mut self, wait_ms: u64) -> Self {
        self.wait = Duration::from_millis(wait_ms);
        self
    }
}

#[async_trait::async_trait]
impl Command for SendCommand {
    async fn execute(&self) -> CliResult<()> {
        let target = self.context.resolve(&self.target)?;
        let session =
            RemoteSession::connect(target.session, self.context.device_logger(&target.label))?;

        for raw in &self.commands {
            session.send_command(RemoteCommand::parse(raw), false)?;
        }

        // Give atvremote time to execute and answer before tearing it down
        tokio::select! {
            _ = tokio::time::sleep(self.wait) => {}
            _ = session.closed() => {}
        }
        let died = session.is_closed();
        session.disconnect();
        session.closed().await;
        debug!(device = %target.label, died, "Send finished");

        if died {
            output::print_warning("The session closed before all responses arrived");
        } else {
            output::print_success(&format!(
                "Sent {} command(s) to {}",
                self.commands.len(),
                target.label
            ));
        }
        Ok(())
    }
}
