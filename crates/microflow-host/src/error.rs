//! Error types for the Microflow host
//!
//! This module contains the error types used during start-up.

use std::path::PathBuf;

use microflow_core::CoreError;
use thiserror::Error;

/// Host error types
#[derive(Error, Debug)]
pub enum HostError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Definition file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File or directory being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Definition file is not valid YAML for a definitions document
    #[error("Invalid definitions in {path}: {source}")]
    Yaml {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// Engine rejected an operation
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

impl HostError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        HostError::Yaml {
            path: path.into(),
            source,
        }
    }
}
