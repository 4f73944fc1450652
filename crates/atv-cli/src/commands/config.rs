// Show the effective configuration

use std::path::PathBuf;

use super::{AppContext, Command};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// Print where the configuration comes from and its effective values
pub struct ConfigCommand {
    context: AppContext,
    path: PathBuf,
}

impl ConfigCommand {
    pub fn new(context: AppContext, path: PathBuf) -> Self {
        Self { context, path }
    }

    /// Effective configuration as TOML
    pub fn render(&self) -> CliResult<String> {
        toml::to_string_pretty(&self.context.config)
            .map_err(|e| CliError::Internal(format!("Failed to render configuration: {}", e)))
    }
}

#[async_trait::async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let source = if self.path.exists() {
            self.path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", self.path.display())
        };

        println!("{}", style.header("Configuration"));
        println!("{}", style.info(&format!("File: {}", source)));
        println!(
            "{}",
            style.info(&format!("Effective log level: {}", self.context.config.effective_log_level()))
        );
        println!();
        println!("{}", self.render()?);
        Ok(())
    }
}
