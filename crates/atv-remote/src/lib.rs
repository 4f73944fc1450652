//! Supervised `atvremote` control sessions for Apple TV devices
//!
//! This crate owns the long-lived control channel to an Apple TV: a persistent
//! `atvremote ... cli` child process that accepts one command per line on stdin and
//! reports on stdout/stderr.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        RemoteSession                         │
//! │                                                              │
//! │  send_command ──► command channel ──► stdin writer task      │
//! │        │                                    │                │
//! │        └─ last-send timestamp ◄── heartbeat task (60s/45s)   │
//! │                                             │                │
//! │  stdout reader ─┐                           ▼                │
//! │                 ├─► classifier ──► fatal ──► kill switch     │
//! │  stderr reader ─┘                               │            │
//! │                                                 ▼            │
//! │                 supervisor task (owns Child) ── exit ──►     │
//! │                 teardown ──► close slot (fires once)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A session lives for exactly one connection. Once the process exits, callers
//! reconnect by constructing a new [`RemoteSession`].
//!
//! # Module Organization
//!
//! - `command`: remote keys and raw commands understood by `atvremote`
//! - `output`: classification of process output into info and fatal lines
//! - `heartbeat`: keep-alive policy
//! - `close`: single-slot close notification
//! - `sequence`: the "avada kedavra" reset gesture
//! - `logger`: logger trait, level gating and prefixing adapters
//! - `session`: the supervisor itself

pub mod close;
pub mod command;
pub mod error;
pub mod heartbeat;
pub mod logger;
pub mod output;
pub mod sequence;
pub mod session;

pub use close::{CloseCallback, CloseEvent, CloseReason};
pub use command::{Command, RemoteKey, RepeatState, ShuffleState};
pub use error::{RemoteError, Result};
pub use heartbeat::{HeartbeatDecision, HeartbeatPolicy};
pub use logger::{
    LevelLogger, LogLevel, Logger, PrefixLogger, RecordingLogger, Severity, TracingLogger,
};
pub use output::{classify_stdout, OutputLine, StderrPolicy};
pub use sequence::{avada_kedavra_sequence, sequence_delay, DEFAULT_RESET_APP_COUNT};
pub use session::{RemoteSession, SessionConfig};
