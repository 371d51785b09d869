use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLockWriteGuard};
use std::time::Duration;

use crate::config::NubiloConfig;
use crate::config::error::ConfigError;
use crate::kernel::context::{HostContext, SharedContext};
use crate::kernel::logger::Logger;
use crate::plugin_system::change::ChangeDetector;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::{ModuleLoader, PluginModule, ResolvedPlugin, panic_message};
use crate::plugin_system::record::{InvalidReason, PluginRecord, PluginState, RegistrySnapshot};
use crate::plugin_system::scanner::{PluginScan, scan_plugin_root};
use crate::plugin_system::validator::{PluginLayout, StructureValidator, Validation};

/// Settings the supervisor runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub plugin_directory_path: PathBuf,
    pub poll_interval: Duration,
}

impl SupervisorConfig {
    pub fn new(plugin_directory_path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            plugin_directory_path: plugin_directory_path.into(),
            poll_interval,
        }
    }

    /// Derive the supervisor settings from the application configuration.
    pub fn from_config(config: &NubiloConfig) -> Result<Self, ConfigError> {
        if config.plugin_poll_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "plugin_poll_interval".to_string(),
                message: "must be at least one second".to_string(),
            });
        }
        Ok(Self::new(
            config.plugin_directory.clone(),
            Duration::from_secs(config.plugin_poll_interval),
        ))
    }
}

/// What a single reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Removed from the registry because their directory is gone
    pub evicted: Vec<String>,
    /// Unloaded and loaded again after a change
    pub reloaded: Vec<String>,
    /// Loaded for the first time, or again after an earlier failure
    pub loaded: Vec<String>,
    /// Newly failed validation, resolution or `load`
    pub failed: Vec<String>,
}

impl ReconcileReport {
    /// True when the pass changed nothing.
    pub fn is_quiet(&self) -> bool {
        self.evicted.is_empty() && self.reloaded.is_empty() && self.loaded.is_empty() && self.failed.is_empty()
    }
}

enum Attempt {
    Loaded,
    Failed,
    // Still structurally invalid in the way already reported
    Unchanged,
}

/// Owns the plugin registry and keeps it in line with the plugin root.
///
/// Each call to [`reconcile`](Self::reconcile) runs one pass: evict plugins
/// whose directory disappeared, reload loaded plugins whose directory or
/// module file changed, then load new plugins and retry failed ones whose
/// files changed. Every call into plugin code is isolated: errors and panics
/// are logged and turned into a state transition, and the pass carries on
/// with the next plugin.
pub struct PluginSupervisor {
    config: SupervisorConfig,
    validator: StructureValidator,
    detector: ChangeDetector,
    loader: Box<dyn ModuleLoader>,
    logger: Arc<dyn Logger>,
    context: SharedContext,
    registry: BTreeMap<String, PluginRecord>,
    // Non UTF-8 directory names already warned about
    skipped_dirs: BTreeSet<OsString>,
}

impl PluginSupervisor {
    /// Create a supervisor for an existing plugin root.
    pub fn new<L>(
        config: SupervisorConfig,
        loader: L,
        logger: Arc<dyn Logger>,
        context: SharedContext,
    ) -> Result<Self, PluginSystemError>
    where
        L: ModuleLoader + 'static,
    {
        if !config.plugin_directory_path.is_dir() {
            return Err(PluginSystemError::PluginRootMissing(
                config.plugin_directory_path.clone(),
            ));
        }
        let validator = StructureValidator::new(PluginLayout::new(&config.plugin_directory_path));
        Ok(Self {
            config,
            validator,
            detector: ChangeDetector::new(),
            loader: Box::new(loader),
            logger,
            context,
            registry: BTreeMap::new(),
            skipped_dirs: BTreeSet::new(),
        })
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    pub(crate) fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    pub fn record(&self, name: &str) -> Option<&PluginRecord> {
        self.registry.get(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &PluginRecord> {
        self.registry.values()
    }

    pub fn loaded_plugins(&self) -> Vec<&str> {
        self.registry
            .values()
            .filter(|record| record.is_loaded())
            .map(PluginRecord::name)
            .collect()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.values().collect()
    }

    /// Run one reconciliation pass.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let PluginScan { names: scanned, skipped } = match scan_plugin_root(&self.config.plugin_directory_path) {
            Ok(scan) => scan,
            Err(e) => {
                self.logger.error(&format!("Skipping plugin reconciliation pass: {}", e));
                return report;
            }
        };
        for raw in skipped.difference(&self.skipped_dirs) {
            self.logger.warning(&format!("Skipping plugin directory with non UTF-8 name: {:?}", raw));
        }
        self.skipped_dirs = skipped;

        // Evict removed
        let removed: Vec<String> = self
            .registry
            .keys()
            .filter(|name| !scanned.contains(*name))
            .cloned()
            .collect();
        for name in removed {
            if let Some(mut record) = self.registry.remove(&name) {
                self.unload_record(&mut record);
                self.logger.info(&format!("Plugin '{}' removed", name));
                report.evicted.push(name);
            }
        }

        // Reload changed
        let loaded: Vec<String> = self.loaded_plugins().into_iter().map(str::to_string).collect();
        let mut handled = BTreeSet::new();
        for name in loaded {
            let Some(mut record) = self.registry.remove(&name) else {
                continue;
            };
            let (plugin_dir, module_path) = self.paths(&name);
            if self.detector.has_changed(&record, &plugin_dir, &module_path) {
                self.logger.info(&format!("Plugin '{}' changed, reloading", name));
                self.unload_record(&mut record);
                match self.attempt_load(&mut record) {
                    Attempt::Loaded => report.reloaded.push(name.clone()),
                    Attempt::Failed | Attempt::Unchanged => report.failed.push(name.clone()),
                }
                handled.insert(name.clone());
            }
            self.registry.insert(name, record);
        }

        // Load new or previously failed
        for name in scanned {
            if handled.contains(&name) {
                continue;
            }
            let mut record = match self.registry.remove(&name) {
                Some(record) => record,
                None => {
                    self.logger.debug(&format!("Discovered plugin '{}'", name));
                    PluginRecord::new(name.as_str())
                }
            };
            if self.needs_attempt(&record) {
                match self.attempt_load(&mut record) {
                    Attempt::Loaded => report.loaded.push(name.clone()),
                    Attempt::Failed => report.failed.push(name.clone()),
                    Attempt::Unchanged => {}
                }
            }
            self.registry.insert(name, record);
        }

        if !report.is_quiet() {
            self.logger.debug(&format!(
                "Reconciliation pass: {} evicted, {} reloaded, {} loaded, {} failed",
                report.evicted.len(),
                report.reloaded.len(),
                report.loaded.len(),
                report.failed.len()
            ));
        }
        report
    }

    /// Unload every loaded plugin and forget all records.
    ///
    /// The next pass starts from scratch and loads every valid plugin again.
    /// Returns the number of plugins that were loaded.
    pub fn unload_all(&mut self) -> usize {
        let mut unloaded = 0;
        let records = std::mem::take(&mut self.registry);
        for (_, mut record) in records {
            if record.is_loaded() {
                self.unload_record(&mut record);
                unloaded += 1;
            }
        }
        unloaded
    }

    fn paths(&self, name: &str) -> (PathBuf, PathBuf) {
        let layout = self.validator.layout();
        let module_file = self.loader.module_file_name(name);
        (layout.plugin_dir(name), layout.module_path(name, &module_file))
    }

    fn needs_attempt(&self, record: &PluginRecord) -> bool {
        match record.state() {
            PluginState::Discovered | PluginState::Invalid(InvalidReason::Structure) => true,
            PluginState::ValidUnloaded | PluginState::Invalid(InvalidReason::MissingEntryPoint) => {
                let (plugin_dir, module_path) = self.paths(record.name());
                self.detector.has_changed(record, &plugin_dir, &module_path)
            }
            PluginState::Loaded(_) => false,
        }
    }

    fn attempt_load(&self, record: &mut PluginRecord) -> Attempt {
        let name = record.name().to_string();
        let module_file = self.loader.module_file_name(&name);

        match self.validator.validate(record, &module_file, self.logger.as_ref()) {
            Validation::Valid => {}
            Validation::Reported => return Attempt::Failed,
            Validation::Suppressed => return Attempt::Unchanged,
        }

        let (plugin_dir, module_path) = self.paths(&name);
        match self.detector.observe(&plugin_dir, &module_path) {
            Ok(mtimes) => record.record_mtimes(mtimes),
            Err(e) => self.logger.warning(&format!(
                "Could not read modification times of plugin '{}': {}",
                name, e
            )),
        }
        record.mark_valid_unloaded();
        self.logger.info(&format!("Loading plugin '{}'", name));

        let module = match self.open_module(&name, &module_path) {
            Ok(module) => module,
            Err(e) => {
                self.logger.error(&e.to_string());
                return Attempt::Failed;
            }
        };

        let resolved = match panic::catch_unwind(AssertUnwindSafe(|| ResolvedPlugin::resolve(&name, module))) {
            Ok(Ok(resolved)) => resolved,
            Ok(Err(e)) => {
                self.logger.error(&e.to_string());
                if matches!(e, PluginSystemError::MissingEntryPoint { .. }) {
                    record.mark_invalid(InvalidReason::MissingEntryPoint);
                }
                return Attempt::Failed;
            }
            Err(panic_obj) => {
                let err = PluginSystemError::LoadFailure {
                    plugin: name.clone(),
                    message: format!("panic while resolving entry points: {}", panic_message(panic_obj.as_ref())),
                };
                self.logger.error(&err.to_string());
                return Attempt::Failed;
            }
        };

        let result = {
            let mut context = self.write_context();
            resolved.invoke_load(&name, &mut context)
        };
        match result {
            Ok(()) => {
                self.logger.info(&format!("Plugin '{}' loaded", name));
                record.mark_loaded(resolved);
                Attempt::Loaded
            }
            Err(e) => {
                self.logger.error(&e.to_string());
                Attempt::Failed
            }
        }
    }

    fn open_module(
        &self,
        name: &str,
        module_path: &Path,
    ) -> Result<Box<dyn PluginModule>, PluginSystemError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.loader.open(name, module_path))).unwrap_or_else(|panic_obj| {
            Err(PluginSystemError::ModuleOpen {
                plugin: name.to_string(),
                path: module_path.to_path_buf(),
                message: format!("panic: {}", panic_message(panic_obj.as_ref())),
            })
        })
    }

    /// Call `unload` on a loaded record and release its module.
    ///
    /// The record ends up ValidUnloaded whatever `unload` does.
    fn unload_record(&self, record: &mut PluginRecord) {
        let Some(resolved) = record.take_loaded() else {
            return;
        };
        self.logger.info(&format!("Unloading plugin '{}'", record.name()));
        let result = {
            let mut context = self.write_context();
            resolved.invoke_unload(record.name(), &mut context)
        };
        drop(resolved);
        if let Err(e) = result {
            self.logger.error(&e.to_string());
        }
    }

    fn write_context(&self) -> RwLockWriteGuard<'_, HostContext> {
        self.context.write().unwrap_or_else(PoisonError::into_inner)
    }
}
