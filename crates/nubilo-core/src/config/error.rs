//! # Nubilo Core Configuration Errors
//!
//! [`ConfigError`] covers everything that can go wrong while reading the
//! layered configuration files: I/O failures, unknown file formats, parse
//! errors and values that do not fit the expected schema.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse {format} configuration '{path}': {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Configuration does not match the expected schema: {0}")]
    Schema(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
