//! Error types for the Odoo container entrypoint.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing the Odoo configuration.
#[derive(Debug, Error)]
pub enum EntrypointError {
    #[error("File error on {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration line {line} in {path:?}: {content:?}")]
    Parse {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error(
        "cannot determine the instance type, env vars INSTANCE_TYPE and/or ODOO_STAGE must be defined and match"
    )]
    InstanceUndetermined,

    #[error(
        "cannot determine the instance type, env vars INSTANCE_TYPE and ODOO_STAGE must match, got: 'INSTANCE_TYPE={instance_type}' and 'ODOO_STAGE={stage}'"
    )]
    InstanceMismatch { instance_type: String, stage: String },

    #[error("Command `{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to spawn `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl EntrypointError {
    /// Wrap an I/O error with the path it happened on.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EntrypointError::File {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for EntrypointError {
    fn from(err: config::ConfigError) -> Self {
        EntrypointError::Settings(err.to_string())
    }
}
