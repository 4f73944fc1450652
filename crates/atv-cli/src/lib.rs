//! atv-bridge command-line interface
//!
//! `atv-bridge` discovers Apple TVs, sends remote commands, fires the reset
//! gesture and keeps a supervised session alive across disconnects.

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

pub use error::{CliError, CliResult};
pub use router::{Cli, CommandRouter, Commands};
