//! Classification of `atvremote` output lines

use serde::{Deserialize, Serialize};

/// Prompt echoed by `atvremote` in front of each response
pub const RESPONSE_MARKER: &str = "pyatv>";

/// Banner printed once the interactive session is connected
pub const CONNECTED_BANNER: &str = "Enter commands and press enter";

/// One classified line of process output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Nothing left after stripping the prompt; not logged
    Empty,
    /// Ordinary response text
    Info(String),
    /// The connection banner
    Connected(String),
    /// Stderr noise that does not end the session
    Warning(String),
    /// The session must be torn down
    Fatal(String),
}

impl OutputLine {
    pub fn is_fatal(&self) -> bool {
        matches!(self, OutputLine::Fatal(_))
    }
}

/// Classify one line read from stdout.
///
/// The first response marker is stripped and the remainder trimmed. A line
/// mentioning `error` in any casing is fatal.
pub fn classify_stdout(line: &str) -> OutputLine {
    let text = line.replacen(RESPONSE_MARKER, "", 1);
    let text = text.trim();

    if text.is_empty() {
        OutputLine::Empty
    } else if text.to_uppercase().contains("ERROR") {
        OutputLine::Fatal(text.to_string())
    } else if text.contains(CONNECTED_BANNER) {
        OutputLine::Connected(text.to_string())
    } else {
        OutputLine::Info(text.to_string())
    }
}

/// How stderr output is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StderrPolicy {
    /// Every stderr line is fatal
    #[default]
    Strict,
    /// Lines starting with `WARNING` are logged and the session stays up
    DowngradeWarnings,
}

impl StderrPolicy {
    /// Classify one line read from stderr
    pub fn classify(&self, line: &str) -> OutputLine {
        let text = line.trim();
        match self {
            StderrPolicy::DowngradeWarnings if text.starts_with("WARNING") => {
                OutputLine::Warning(text.to_string())
            }
            _ => OutputLine::Fatal(text.to_string()),
        }
    }
}
