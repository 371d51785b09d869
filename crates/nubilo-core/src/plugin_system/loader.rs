use std::any::Any;
use std::ffi::OsString;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::kernel::context::HostContext;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::ffi::{LOAD_SYMBOL, UNLOAD_SYMBOL};

/// A resolved `load` or `unload` entry point.
pub type EntryPoint = Box<dyn Fn(&mut HostContext) -> Result<(), String> + Send>;

/// An opened plugin module.
///
/// Dropping the module releases it; entry points resolved from it must not
/// outlive it.
pub trait PluginModule: Send {
    fn resolve(&self, symbol: &str) -> Option<EntryPoint>;
}

/// Opens plugin modules found under the plugin root.
pub trait ModuleLoader: Send {
    /// File name of the module inside `plugin_root/<plugin>/`.
    fn module_file_name(&self, plugin: &str) -> OsString;

    fn open(&self, plugin: &str, path: &Path) -> Result<Box<dyn PluginModule>, PluginSystemError>;
}

/// Entry points of a loaded plugin, kept together with the module they came from.
pub struct ResolvedPlugin {
    load_fn: EntryPoint,
    unload_fn: EntryPoint,
    // Declared last so the entry points are dropped before the module.
    _module: Box<dyn PluginModule>,
}

impl ResolvedPlugin {
    /// Resolve both entry points, failing on the first missing one.
    pub fn resolve(plugin: &str, module: Box<dyn PluginModule>) -> Result<Self, PluginSystemError> {
        let missing = |symbol: &str| PluginSystemError::MissingEntryPoint {
            plugin: plugin.to_string(),
            symbol: symbol.to_string(),
        };
        let load_fn = module.resolve(LOAD_SYMBOL).ok_or_else(|| missing(LOAD_SYMBOL))?;
        let unload_fn = module.resolve(UNLOAD_SYMBOL).ok_or_else(|| missing(UNLOAD_SYMBOL))?;
        Ok(Self {
            load_fn,
            unload_fn,
            _module: module,
        })
    }

    pub fn invoke_load(&self, plugin: &str, context: &mut HostContext) -> Result<(), PluginSystemError> {
        guarded(|| (self.load_fn)(context)).map_err(|message| PluginSystemError::LoadFailure {
            plugin: plugin.to_string(),
            message,
        })
    }

    pub fn invoke_unload(&self, plugin: &str, context: &mut HostContext) -> Result<(), PluginSystemError> {
        guarded(|| (self.unload_fn)(context)).map_err(|message| PluginSystemError::UnloadFailure {
            plugin: plugin.to_string(),
            message,
        })
    }
}

impl fmt::Debug for ResolvedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPlugin").finish_non_exhaustive()
    }
}

/// Run plugin code, turning both error returns and panics into a message.
pub(crate) fn guarded<T, F>(call: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, String>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(panic_obj) => Err(format!("panic: {}", panic_message(panic_obj.as_ref()))),
    }
}

pub(crate) fn panic_message(panic_obj: &(dyn Any + Send)) -> String {
    if let Some(s_ref) = panic_obj.downcast_ref::<&'static str>() {
        (*s_ref).to_string()
    } else if let Some(s_obj) = panic_obj.downcast_ref::<String>() {
        s_obj.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}
