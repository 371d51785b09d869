//! # Nubilo Core Kernel
//!
//! The `kernel` module holds the pieces every other subsystem leans on:
//!
//! - **Error Handling**: the crate-wide [`Error`](error::Error) and `Result`
//!   alias in the `error` submodule, wrapping the typed subsystem errors.
//! - **Host Context**: [`HostContext`](context::HostContext), the object handed
//!   to every plugin entry point. It carries the application [`Menu`](menu::Menu)
//!   and an [`ExtensionRegistry`](extensions::ExtensionRegistry) of host services.
//! - **Logging**: the [`Logger`](logger::Logger) collaborator the plugin
//!   supervisor reports through, with a default forwarding to the `log` facade.
//! - **Core Constants**: names and defaults in the `constants` submodule.
pub mod constants;
pub mod context;
pub mod error;
pub mod extensions;
pub mod logger;
pub mod menu;

pub use context::{HostContext, SharedContext};
pub use error::{Error, Result};
pub use extensions::ExtensionRegistry;
pub use logger::{FacadeLogger, Logger};
pub use menu::{Menu, MenuEntry, MenuError};

// Test module declaration
#[cfg(test)]
mod tests;
