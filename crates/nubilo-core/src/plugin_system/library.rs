//! Dynamic-library module loader.
use std::ffi::{c_void, OsString};
use std::path::Path;

use libloading::Library;

use crate::kernel::context::HostContext;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::ffi::{FfiErrorSink, FfiResult, RawEntryPoint};
use crate::plugin_system::loader::{EntryPoint, ModuleLoader, PluginModule};

/// Opens plugin modules as platform shared libraries.
///
/// The module of plugin `name` is `lib<name>.so` on Linux, `lib<name>.dylib`
/// on macOS and `<name>.dll` on Windows. It must export `load` and `unload`
/// as [`RawEntryPoint`]s. A message the plugin writes into the error sink is
/// appended to the generic failure description.
///
/// Whether reopening a rebuilt library really maps the new file depends on
/// the platform loader: a library that cannot be unloaded (for example one
/// that registered thread-local destructors) stays mapped and is handed back
/// on the next open.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryLoader;

impl LibraryLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for LibraryLoader {
    fn module_file_name(&self, plugin: &str) -> OsString {
        libloading::library_filename(plugin)
    }

    fn open(&self, plugin: &str, path: &Path) -> Result<Box<dyn PluginModule>, PluginSystemError> {
        let library = unsafe { Library::new(path) }.map_err(|e| PluginSystemError::ModuleOpen {
            plugin: plugin.to_string(),
            path: path.to_path_buf(),
            message: format!("libloading error: {}", e),
        })?;
        Ok(Box::new(LibraryModule { library }))
    }
}

struct LibraryModule {
    library: Library,
}

impl PluginModule for LibraryModule {
    fn resolve(&self, symbol: &str) -> Option<EntryPoint> {
        let entry: RawEntryPoint = unsafe { self.library.get::<RawEntryPoint>(symbol.as_bytes()) }
            .ok()
            .map(|sym| *sym)?;

        Some(Box::new(move |context: &mut HostContext| {
            let context_ptr = context as *mut HostContext as *mut c_void;
            let mut message = String::new();
            let mut sink = FfiErrorSink::new(&mut message);
            let outcome = unsafe { entry(context_ptr, &mut sink) };
            match outcome {
                FfiResult::Ok => Ok(()),
                other if message.is_empty() => Err(other.describe().to_string()),
                other => Err(format!("{}: {}", other.describe(), message)),
            }
        }))
    }
}
