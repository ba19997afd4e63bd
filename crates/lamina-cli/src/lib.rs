//! Command dispatcher for Lamina.
//!
//! Parses the verb-plus-arguments line protocol into [`Command`]s and runs
//! them against a [`Session`]'s layer stack. The `lamina` binary wires this
//! to a script file or stdin.

pub mod command;
pub mod config;
mod error;
pub mod session;

pub use command::Command;
pub use config::AppConfig;
pub use error::{CommandError, ConfigError};
pub use session::{Flow, Session, run_interactive, run_script};
