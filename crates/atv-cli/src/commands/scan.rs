// Discover devices on the network

use atv_discovery::{AtvScriptScanner, DeviceDirectory};

use super::{AppContext, Command};
use crate::error::CliResult;
use crate::output::OutputStyle;

/// Run discovery and list the Apple TVs found
pub struct ScanCommand {
    context: AppContext,
    extra_hosts: Vec<String>,
}

impl ScanCommand {
    pub fn new(context: AppContext, extra_hosts: Vec<String>) -> Self {
        Self {
            context,
            extra_hosts,
        }
    }
}

#[async_trait::async_trait]
impl Command for ScanCommand {
    async fn execute(&self) -> CliResult<()> {
        let mut settings = self.context.config.discover.clone();
        for host in &self.extra_hosts {
            if !settings.unicast.contains(host) {
                settings.unicast.push(host.clone());
            }
        }

        let atvscript = self.context.pyatv_paths().atvscript;
        let directory = DeviceDirectory::new(AtvScriptScanner::new(atvscript.to_string_lossy()));
        let devices = directory.discover(&settings).await?;

        let style = OutputStyle::default();
        if devices.is_empty() {
            println!("{}", style.warning("No Apple TV found"));
            return Ok(());
        }

        println!("{}", style.header(&format!("Found {} Apple TV(s)", devices.len())));
        for device in &devices {
            println!("  {}", style.device(device));
        }
        Ok(())
    }
}
