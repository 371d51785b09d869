//! # Nubilo Core Kernel Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Subsystems keep their own typed errors ([`PluginSystemError`],
//! [`ConfigError`], [`MenuError`]); this enum wraps them so that callers
//! which drive several subsystems, such as the `nubilo` binary, can use a
//! single `Result` type with `?`.
use std::fmt;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::kernel::menu::MenuError;
use crate::plugin_system::error::PluginSystemError;

/// Custom error type for the Nubilo core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Menu registration error
    #[error("Menu error: {0}")]
    Menu(#[from] MenuError),

    /// The supervisor's background task failed outside of plugin code.
    #[error("Supervisor error during {phase}: {message}")]
    Supervisor {
        phase: SupervisorPhase,
        message: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Phase of the supervisor's background task in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorPhase {
    Reconcile,
    Stop,
}

impl fmt::Display for SupervisorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorPhase::Reconcile => write!(f, "reconcile"),
            SupervisorPhase::Stop => write!(f, "stop"),
        }
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    pub(crate) fn supervisor(phase: SupervisorPhase, message: impl Into<String>) -> Self {
        Error::Supervisor {
            phase,
            message: message.into(),
        }
    }
}
