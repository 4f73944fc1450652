// Fire the reset gesture

use std::time::Duration;

use atv_remote::{avada_kedavra_sequence, sequence_delay, RemoteSession};

use super::{AppContext, Command};
use crate::error::CliResult;
use crate::output;

/// Extra time for atvremote to connect before the first key press
const CONNECT_ALLOWANCE: Duration = Duration::from_secs(5);

/// Close all apps through the one-shot reset process
pub struct ResetCommand {
    context: AppContext,
    target: String,
    app_count: Option<usize>,
}

impl ResetCommand {
    pub fn new(context: AppContext, target: String) -> Self {
        Self {
            context,
            target,
            app_count: None,
        }
    }

    pub fn with_app_count(mut self, app_count: Option<usize>) -> Self {
        self.app_count = app_count;
        self
    }
}

#[async_trait::async_trait]
impl Command for ResetCommand {
    async fn execute(&self) -> CliResult<()> {
        let mut target = self.context.resolve(&self.target)?;
        if let Some(count) = self.app_count {
            target.session.reset_app_count = count;
        }
        let count = target.session.reset_app_count;

        let session =
            RemoteSession::connect(target.session, self.context.device_logger(&target.label))?;
        session.avada_kedavra()?;

        let expected = sequence_delay(&avada_kedavra_sequence(count)) + CONNECT_ALLOWANCE;
        output::print_info(&format!(
            "Closing up to {} apps on {} (about {}s)",
            count,
            target.label,
            expected.as_secs()
        ));
        tokio::time::sleep(expected).await;

        session.disconnect();
        session.closed().await;
        output::print_success("Reset sequence sent");
        Ok(())
    }
}
