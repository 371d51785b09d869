//! # Nubilo Core
//!
//! Core library of the Nubilo host application: the plugin supervisor that
//! discovers, validates, loads, hot-reloads and unloads plugins from a watched
//! directory, the host context plugins register against, and the layered
//! configuration the binary is driven by.
pub mod config;
pub mod kernel;
pub mod plugin_system;

// Re-export key public types for the binary and for plugin crates
pub use config::{ConfigLoader, NubiloConfig};
pub use kernel::error::Error as KernelError;
pub use kernel::{HostContext, Logger, Menu, SharedContext};
pub use plugin_system::{
    LibraryLoader, ModuleLoader, PluginStatus, PluginSupervisor, StaticModuleLoader,
    SupervisorConfig, SupervisorHandle,
};
