// Tracing subscriber setup

use atv_remote::LogLevel;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, CliResult};

/// Crates whose events are shown; `atv_bridge` is the operator log target
const TARGETS: [&str; 6] = [
    "atv_bridge",
    "atv_cli",
    "atv_config",
    "atv_discovery",
    "atv_process",
    "atv_remote",
];

/// Filter directive for `level`, e.g. `atv_bridge=info,atv_cli=info,...`
pub fn filter_directive(level: LogLevel) -> String {
    let level = match level {
        LogLevel::None => "off",
        other => other.as_str(),
    };
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize logging; `RUST_LOG` wins over `--verbose` and the configured level
pub fn init_logging(verbose: bool, configured: LogLevel) -> CliResult<()> {
    let level = if verbose { LogLevel::Debug } else { configured };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::Internal(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let directive = filter_directive(LogLevel::Warn);
        assert!(directive.starts_with("atv_bridge=warn,"));
        assert_eq!(directive.split(',').count(), TARGETS.len());
        assert!(filter_directive(LogLevel::None).contains("atv_remote=off"));
    }
}
