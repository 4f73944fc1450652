// CLI error types

use atv_config::ConfigError;
use atv_discovery::DiscoveryError;
use atv_remote::RemoteError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'atv-bridge --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(e) => {
                format!(
                    "Configuration error: {}\n\nRun 'atv-bridge config' to check your configuration.",
                    e
                )
            }
            CliError::Discovery(e) => {
                format!(
                    "Discovery failed: {}\n\nCheck that atvscript is installed and the network allows scanning.",
                    e
                )
            }
            CliError::Remote(RemoteError::Process(e)) => {
                format!(
                    "Could not start atvremote: {}\n\nSet atvremote_path in the configuration if it is not on PATH.",
                    e
                )
            }
            CliError::Remote(e) => format!("Remote session error: {}", e),
            CliError::Internal(msg) => format!("Internal error: {}\n\nPlease report this issue.", msg),
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_mentions_help() {
        let err = CliError::InvalidArgument {
            message: "missing target".to_string(),
        };
        assert!(err.user_message().contains("atv-bridge --help"));
    }

    #[test]
    fn test_session_closed_message() {
        let err: CliError = RemoteError::SessionClosed.into();
        assert_eq!(err.user_message(), "Remote session error: Remote session is closed");
    }
}
