use std::path::PathBuf;

use lamina_codec::{CodecError, ManifestError};
use lamina_core::EditError;

/// Anything a command line can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command {0:?} (try `help`)")]
    UnknownVerb(String),

    #[error("{verb}: {reason} (usage: {usage})")]
    Usage {
        verb: String,
        reason: String,
        usage: &'static str,
    },

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<CommandError>,
    },
}

/// Failures while assembling the application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("environment variable {var}={value:?} is invalid: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },
}
