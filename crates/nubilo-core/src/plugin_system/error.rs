//! # Nubilo Core Plugin System Errors
//!
//! [`PluginSystemError`] names every way a plugin can fail at the supervisor
//! boundary. Apart from [`PluginSystemError::PluginRootMissing`], which is
//! returned when a supervisor is constructed, these errors are logged and
//! turned into state transitions; they never escape a reconciliation pass.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin '{plugin}' has an invalid structure, expected {}", list_paths(.expected))]
    InvalidStructure {
        plugin: String,
        expected: Vec<PathBuf>,
    },

    #[error("Plugin '{plugin}' does not export the '{symbol}' entry point")]
    MissingEntryPoint { plugin: String, symbol: String },

    #[error("Failed to open module of plugin '{plugin}' at '{path}': {message}")]
    ModuleOpen {
        plugin: String,
        path: PathBuf,
        message: String,
    },

    #[error("Plugin '{plugin}' failed to load: {message}")]
    LoadFailure { plugin: String, message: String },

    #[error("Plugin '{plugin}' failed to unload: {message}")]
    UnloadFailure { plugin: String, message: String },

    #[error("Plugin root not found: {0}")]
    PluginRootMissing(PathBuf),

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl PluginSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        PluginSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(" and ")
}
