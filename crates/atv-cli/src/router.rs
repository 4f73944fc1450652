// Command routing and dispatch

use std::path::PathBuf;

use atv_config::{BridgeConfig, ConfigManager, ConfigManagerTrait};
use clap::{Parser, Subcommand};

use crate::commands::*;
use crate::error::CliResult;

/// atv-bridge - control Apple TV devices through atvremote
#[derive(Parser, Debug)]
#[command(name = "atv-bridge")]
#[command(bin_name = "atv-bridge")]
#[command(about = "Control Apple TV devices through atvremote")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: <config dir>/atv-bridge/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Discover Apple TVs on the network
    Scan {
        /// Probe these hosts directly in addition to the configured discovery
        #[arg(long = "host", value_name = "ADDRESS")]
        hosts: Vec<String>,
    },

    /// Send remote commands to a device
    Send {
        /// Device name, address or MAC
        #[arg(value_name = "TARGET")]
        target: String,

        /// Keys (e.g. `home`, `play_pause`) or raw commands (e.g. `launch_app=<id>`)
        #[arg(value_name = "COMMAND", required = true)]
        commands: Vec<String>,

        /// How long to wait for responses before disconnecting
        #[arg(long, default_value_t = 1000, value_name = "MS")]
        wait_ms: u64,
    },

    /// Close all open apps and return to the home screen
    Reset {
        /// Device name, address or MAC
        #[arg(value_name = "TARGET")]
        target: String,

        /// Number of apps to swipe away
        #[arg(long, value_name = "N")]
        apps: Option<usize>,
    },

    /// Keep a supervised session open, reconnecting when it drops
    Run {
        /// Device name, address or MAC
        #[arg(value_name = "TARGET")]
        target: String,
    },

    /// Show the effective configuration
    Config,
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();
        let (manager, config) = Self::load_config(&cli)?;

        crate::logging::init_logging(cli.verbose, config.effective_log_level())?;

        Self::execute(&cli, manager, config).await
    }

    /// Load the configuration named on the command line, or the default one
    pub fn load_config(cli: &Cli) -> CliResult<(ConfigManager, BridgeConfig)> {
        let mut manager = match &cli.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new(),
        };
        let config = manager.load_config()?;
        Ok((manager, config))
    }

    /// Execute a command
    pub async fn execute(cli: &Cli, manager: ConfigManager, config: BridgeConfig) -> CliResult<()> {
        let context = AppContext::new(config);

        match &cli.command {
            Commands::Scan { hosts } => ScanCommand::new(context, hosts.clone()).execute().await,
            Commands::Send {
                target,
                commands,
                wait_ms,
            } => {
                SendCommand::new(context, target.clone(), commands.clone())
                    .with_wait_ms(*wait_ms)
                    .execute()
                    .await
            }
            Commands::Reset { target, apps } => {
                ResetCommand::new(context, target.clone())
                    .with_app_count(*apps)
                    .execute()
                    .await
            }
            Commands::Run { target } => RunCommand::new(context, target.clone()).execute().await,
            Commands::Config => {
                ConfigCommand::new(context, manager.config_path().to_path_buf())
                    .execute()
                    .await
            }
        }
    }
}
