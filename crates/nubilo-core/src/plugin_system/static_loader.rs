//! In-process module loader.
//!
//! Entry points are registered by plugin name up front, for plugins compiled
//! into the host binary. Discovery and lifecycle still follow the plugin
//! directory: a registered plugin is only loaded while `plugin_root/<name>/`
//! holds the package marker and a module file called `<name>`, and it is
//! reloaded when either changes.
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::kernel::context::HostContext;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::ffi::{LOAD_SYMBOL, UNLOAD_SYMBOL};
use crate::plugin_system::loader::{EntryPoint, ModuleLoader, PluginModule};

type SharedEntryPoint = Arc<dyn Fn(&mut HostContext) -> Result<(), String> + Send + Sync>;

/// Entry points of one statically registered plugin.
///
/// Either entry point may be left out, in which case resolving it fails just
/// like a library missing the symbol.
#[derive(Clone, Default)]
pub struct StaticPlugin {
    load: Option<SharedEntryPoint>,
    unload: Option<SharedEntryPoint>,
}

impl StaticPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load<F>(mut self, load: F) -> Self
    where
        F: Fn(&mut HostContext) -> Result<(), String> + Send + Sync + 'static,
    {
        self.load = Some(Arc::new(load));
        self
    }

    pub fn with_unload<F>(mut self, unload: F) -> Self
    where
        F: Fn(&mut HostContext) -> Result<(), String> + Send + Sync + 'static,
    {
        self.unload = Some(Arc::new(unload));
        self
    }
}

impl fmt::Debug for StaticPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticPlugin")
            .field("load", &self.load.is_some())
            .field("unload", &self.unload.is_some())
            .finish()
    }
}

/// Loader for plugins registered in-process.
///
/// Clones share the same registrations and counters, so a host can keep one
/// clone to register plugins while the supervisor owns another.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleLoader {
    plugins: Arc<Mutex<HashMap<String, StaticPlugin>>>,
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the entry points for `name`.
    pub fn register(&self, name: impl Into<String>, plugin: StaticPlugin) -> Option<StaticPlugin> {
        self.plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), plugin)
    }

    pub fn unregister(&self, name: &str) -> Option<StaticPlugin> {
        self.plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    /// Number of modules currently open.
    pub fn live_modules(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of modules that were open at the same time.
    pub fn peak_live_modules(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Total number of successful opens.
    pub fn opened_modules(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn module_file_name(&self, plugin: &str) -> OsString {
        OsString::from(plugin)
    }

    fn open(&self, plugin: &str, path: &Path) -> Result<Box<dyn PluginModule>, PluginSystemError> {
        let registered = self
            .plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(plugin)
            .cloned();

        let Some(registered) = registered else {
            return Err(PluginSystemError::ModuleOpen {
                plugin: plugin.to_string(),
                path: path.to_path_buf(),
                message: "no static plugin registered under this name".to_string(),
            });
        };

        let now_live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_live, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(StaticModule {
            plugin: registered,
            live: Arc::clone(&self.live),
        }))
    }
}

struct StaticModule {
    plugin: StaticPlugin,
    live: Arc<AtomicUsize>,
}

impl PluginModule for StaticModule {
    fn resolve(&self, symbol: &str) -> Option<EntryPoint> {
        let entry = match symbol {
            LOAD_SYMBOL => self.plugin.load.clone(),
            UNLOAD_SYMBOL => self.plugin.unload.clone(),
            _ => None,
        }?;
        Some(Box::new(move |context: &mut HostContext| entry(context)))
    }
}

impl Drop for StaticModule {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
