//! # Nubilo Core Plugin System
//!
//! Hot-reloading plugin supervision for a watched plugin root.
//!
//! Every immediate subdirectory of the plugin root is a candidate plugin. A
//! candidate is valid when it holds the package marker
//! ([`PACKAGE_MARKER`](validator::PACKAGE_MARKER)) and a module file named after
//! the directory. Valid plugins have their module opened, their `load` and
//! `unload` entry points resolved, and `load` called with the shared
//! [`HostContext`](crate::kernel::HostContext).
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`scanner`]**: lists the candidate names under the plugin root.
//! - **[`validator`]**: the directory convention and the structural check.
//! - **[`change`]**: modification-time tracking, the sole reload trigger.
//! - **[`loader`]**: the [`ModuleLoader`] seam and the resolved entry points,
//!   with [`library`] (dynamic libraries via `libloading`) and
//!   [`static_loader`] (in-process registrations) as implementations.
//! - **[`ffi`]**: the C ABI plugins export and the [`export_plugin!`](crate::export_plugin) macro.
//! - **[`record`]**: per-plugin state and registry snapshots.
//! - **[`supervisor`]**: the reconciliation pass (evict removed, reload
//!   changed, load new) with failure isolation at every plugin call.
//! - **[`handle`]**: the background polling task and its cancellation.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod change;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod library;
pub mod loader;
pub mod record;
pub mod scanner;
pub mod static_loader;
pub mod supervisor;
pub mod validator;

pub use error::PluginSystemError;
pub use handle::SupervisorHandle;
pub use library::LibraryLoader;
pub use loader::{EntryPoint, ModuleLoader, PluginModule};
pub use record::{PluginRecord, PluginStatus, RegistrySnapshot};
pub use static_loader::{StaticModuleLoader, StaticPlugin};
pub use supervisor::{PluginSupervisor, ReconcileReport, SupervisorConfig};
pub use validator::PACKAGE_MARKER;

// Test module declaration
#[cfg(test)]
mod tests;
