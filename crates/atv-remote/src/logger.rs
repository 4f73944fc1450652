//! Operator-facing logging
//!
//! Messages that an operator reads (sent commands, device output, connection loss)
//! go through the [`Logger`] trait rather than straight to `tracing`, so they can be
//! labelled per device and per component:
//!
//! ```text
//! PrefixLogger("Rocket Remote") ─► PrefixLogger("Living Room") ─► LevelLogger ─► TracingLogger
//! ```
//!
//! renders `info("up")` as `[I] Living Room: Rocket Remote: up`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// Sink for operator-facing messages
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// A positive milestone such as "Connected"; rendered as info by default
    fn success(&self, message: &str) {
        self.info(message);
    }
}

/// Forwards messages to `tracing` under the `atv_bridge` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "atv_bridge", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "atv_bridge", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "atv_bridge", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "atv_bridge", "{}", message);
    }
}

/// Verbosity of a [`LevelLogger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    /// Level forced by the `DEBUG` environment variable, if any.
    ///
    /// Any value other than `false` (case-insensitive) enables debug output.
    pub fn from_debug_env() -> Option<Self> {
        std::env::var("DEBUG")
            .ok()
            .filter(|value| !value.eq_ignore_ascii_case("false"))
            .map(|_| LogLevel::Debug)
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(LogLevel::None),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Gates messages by [`LogLevel`] and tags them with their severity.
///
/// Debug messages are forwarded to the sink's `info` so they stay visible when the
/// host only shows info and above; the `[D]` tag marks them.
pub struct LevelLogger {
    sink: Arc<dyn Logger>,
    level: LogLevel,
}

impl LevelLogger {
    /// Create a level logger; a set `DEBUG` env var overrides `level`
    pub fn new(sink: Arc<dyn Logger>, level: LogLevel) -> Self {
        Self {
            sink,
            level: LogLevel::from_debug_env().unwrap_or(level),
        }
    }

    /// Create a level logger ignoring the `DEBUG` env var
    pub fn with_exact_level(sink: Arc<dyn Logger>, level: LogLevel) -> Self {
        Self { sink, level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl Logger for LevelLogger {
    fn debug(&self, message: &str) {
        if self.level >= LogLevel::Debug {
            self.sink.info(&format!("[D] {}", message));
        }
    }

    fn info(&self, message: &str) {
        if self.level >= LogLevel::Info {
            self.sink.info(&format!("[I] {}", message));
        }
    }

    fn warn(&self, message: &str) {
        if self.level >= LogLevel::Warn {
            self.sink.warn(&format!("[W] {}", message));
        }
    }

    fn error(&self, message: &str) {
        if self.level >= LogLevel::Error {
            self.sink.error(&format!("[E] {}", message));
        }
    }

    fn success(&self, message: &str) {
        if self.level >= LogLevel::Info {
            self.sink.success(&format!("[S] {}", message));
        }
    }
}

/// Prepends `"<prefix>: "` to every message before forwarding it.
///
/// The sink may itself be a `PrefixLogger`; the outermost prefix ends up innermost
/// in the rendered message, right before the text.
pub struct PrefixLogger {
    sink: Arc<dyn Logger>,
    prefix: RwLock<String>,
}

impl PrefixLogger {
    pub fn new(sink: Arc<dyn Logger>, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: RwLock::new(prefix.into()),
        }
    }

    /// Replace the prefix for all subsequent messages
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        *self.prefix.write() = prefix.into();
    }

    pub fn prefix(&self) -> String {
        self.prefix.read().clone()
    }

    fn extend(&self, message: &str) -> String {
        format!("{}: {}", self.prefix.read(), message)
    }
}

impl Logger for PrefixLogger {
    fn debug(&self, message: &str) {
        self.sink.debug(&self.extend(message));
    }

    fn info(&self, message: &str) {
        self.sink.info(&self.extend(message));
    }

    fn warn(&self, message: &str) {
        self.sink.warn(&self.extend(message));
    }

    fn error(&self, message: &str) {
        self.sink.error(&self.extend(message));
    }

    fn success(&self, message: &str) {
        self.sink.success(&self.extend(message));
    }
}

/// Severity recorded by a [`RecordingLogger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Success,
}

/// Keeps every message in memory.
///
/// Useful for surfacing session output in a UI, and in tests.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in arrival order
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().clone()
    }

    /// Messages recorded at `severity`
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether a message at `severity` contains `needle`
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|(s, m)| *s == severity && m.contains(needle))
    }

    fn push(&self, severity: Severity, message: &str) {
        self.entries.lock().push((severity, message.to_string()));
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push(Severity::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Severity::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(Severity::Success, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_prefix() {
        let base = Arc::new(RecordingLogger::new());
        let log = PrefixLogger::new(base.clone(), "X");

        log.info("hello");

        assert_eq!(base.messages(Severity::Info), vec!["X: hello"]);
    }

    #[test]
    fn test_nested_prefix() {
        let base = Arc::new(RecordingLogger::new());
        let inner = Arc::new(PrefixLogger::new(base.clone(), "inner"));
        let outer = PrefixLogger::new(inner, "outer");

        outer.info("m");

        assert_eq!(base.messages(Severity::Info), vec!["inner: outer: m"]);
    }

    #[test]
    fn test_prefix_applies_to_every_severity() {
        let base = Arc::new(RecordingLogger::new());
        let log = PrefixLogger::new(base.clone(), "P");

        log.debug("d");
        log.info("i");
        log.warn("w");
        log.error("e");
        log.success("s");

        assert_eq!(
            base.entries(),
            vec![
                (Severity::Debug, "P: d".to_string()),
                (Severity::Info, "P: i".to_string()),
                (Severity::Warn, "P: w".to_string()),
                (Severity::Error, "P: e".to_string()),
                (Severity::Success, "P: s".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_prefix() {
        let base = Arc::new(RecordingLogger::new());
        let log = PrefixLogger::new(base.clone(), "before");

        log.set_prefix("after");
        log.warn("moved");

        assert_eq!(log.prefix(), "after");
        assert_eq!(base.messages(Severity::Warn), vec!["after: moved"]);
    }

    #[test]
    fn test_level_logger_gates_and_tags() {
        let base = Arc::new(RecordingLogger::new());
        let log = LevelLogger::with_exact_level(base.clone(), LogLevel::Warn);

        log.debug("hidden");
        log.info("hidden");
        log.warn("shown");
        log.error("shown too");

        assert_eq!(
            base.entries(),
            vec![
                (Severity::Warn, "[W] shown".to_string()),
                (Severity::Error, "[E] shown too".to_string()),
            ]
        );
    }

    #[test]
    fn test_level_logger_debug_goes_to_info() {
        let base = Arc::new(RecordingLogger::new());
        let log = LevelLogger::with_exact_level(base.clone(), LogLevel::Debug);

        log.debug("details");

        assert_eq!(base.messages(Severity::Info), vec!["[D] details"]);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug > LogLevel::Info);
    }
}
