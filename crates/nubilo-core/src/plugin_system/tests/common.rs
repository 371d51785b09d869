//! Fixtures shared by the plugin system tests.
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use log::Level;
use tempfile::{tempdir, TempDir};

use crate::kernel::context::{HostContext, SharedContext};
use crate::kernel::logger::Logger;
use crate::plugin_system::static_loader::{StaticModuleLoader, StaticPlugin};
use crate::plugin_system::supervisor::{PluginSupervisor, SupervisorConfig};
use crate::plugin_system::validator::PACKAGE_MARKER;

/// Logger that keeps every message for later assertions.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    pub fn errors_containing(&self, needle: &str) -> usize {
        self.errors().iter().filter(|m| m.contains(needle)).count()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().unwrap().push((level, message.to_string()));
    }
}

/// Ordered record of entry-point calls, e.g. `load:alpha`.
#[derive(Debug, Default, Clone)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// A temporary plugin root wired to a static loader.
pub struct TestEnv {
    pub root: TempDir,
    pub loader: StaticModuleLoader,
    pub logger: Arc<RecordingLogger>,
    pub context: SharedContext,
    pub calls: CallLog,
    tick: AtomicU64,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_context(HostContext::new())
    }

    /// Plugins log through the same recording logger as the supervisor.
    pub fn with_context(context: HostContext) -> Self {
        let logger = Arc::new(RecordingLogger::default());
        Self {
            root: tempdir().expect("Failed to create temporary plugin root"),
            loader: StaticModuleLoader::new(),
            context: context.with_logger(logger.clone()).into_shared(),
            logger,
            calls: CallLog::default(),
            tick: AtomicU64::new(1),
        }
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn plugin_dir(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Module file path for the static loader, which names it after the plugin.
    pub fn module_path(&self, name: &str) -> PathBuf {
        self.plugin_dir(name).join(name)
    }

    pub fn supervisor(&self) -> PluginSupervisor {
        self.supervisor_with_interval(Duration::from_millis(50))
    }

    pub fn supervisor_with_interval(&self, poll_interval: Duration) -> PluginSupervisor {
        let config = SupervisorConfig::new(self.root.path(), poll_interval);
        PluginSupervisor::new(
            config,
            self.loader.clone(),
            self.logger.clone(),
            self.context.clone(),
        )
        .expect("Failed to create supervisor")
    }

    /// Create a well-formed plugin directory.
    pub fn create_plugin(&self, name: &str) {
        let dir = self.plugin_dir(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PACKAGE_MARKER), "").unwrap();
        fs::write(dir.join(name), b"module").unwrap();
    }

    /// Plugin whose entry points only record that they ran.
    pub fn register_counting(&self, name: &str) {
        let (load_calls, unload_calls) = (self.calls.clone(), self.calls.clone());
        let (load_name, unload_name) = (name.to_string(), name.to_string());
        self.loader.register(
            name,
            StaticPlugin::new()
                .with_load(move |_| {
                    load_calls.push(format!("load:{}", load_name));
                    Ok(())
                })
                .with_unload(move |_| {
                    unload_calls.push(format!("unload:{}", unload_name));
                    Ok(())
                }),
        );
    }

    /// Plugin that adds a menu entry on load and removes it on unload.
    pub fn register_menu_plugin(&self, name: &str) {
        let (load_calls, unload_calls) = (self.calls.clone(), self.calls.clone());
        let (load_name, unload_name) = (name.to_string(), name.to_string());
        self.loader.register(
            name,
            StaticPlugin::new()
                .with_load(move |ctx| {
                    load_calls.push(format!("load:{}", load_name));
                    ctx.menu_mut()
                        .add_item(&load_name, load_name.clone(), format!("/{}", load_name))
                        .map_err(|e| e.to_string())
                })
                .with_unload(move |ctx| {
                    unload_calls.push(format!("unload:{}", unload_name));
                    ctx.menu_mut().remove_app(&unload_name);
                    Ok(())
                }),
        );
    }

    /// Set a path's mtime to a fresh point in the future. Works on directories too.
    pub fn touch(&self, path: &Path) {
        let step = self.tick.fetch_add(1, Ordering::SeqCst);
        let when = SystemTime::now() + Duration::from_secs(100 * step);
        File::open(path)
            .and_then(|file| file.set_modified(when))
            .expect("Failed to set modification time");
    }
}
