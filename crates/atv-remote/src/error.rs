//! Error types for remote sessions

use atv_process::ProcessError;
use thiserror::Error;

/// Remote session errors
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The session's process has exited; construct a new session to reconnect
    #[error("Remote session is closed")]
    SessionClosed,

    /// Spawning or controlling the `atvremote` process failed
    #[error("atvremote process error: {0}")]
    Process(#[from] ProcessError),

    /// A stdio pipe was not captured at spawn time
    #[error("atvremote {0} pipe is not available")]
    MissingStream(&'static str),
}

/// Result type for remote session operations
pub type Result<T> = std::result::Result<T, RemoteError>;
