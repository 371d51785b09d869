use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::kernel::logger::Logger;
use crate::plugin_system::change::modified;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::record::{InvalidReason, PluginRecord, StructureFault};

/// File that marks a directory as a plugin package.
pub const PACKAGE_MARKER: &str = "plugin.toml";

/// Paths making up the plugin directory convention:
/// `root/<name>/plugin.toml` and `root/<name>/<module file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLayout {
    root: PathBuf,
}

impl PluginLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plugin_dir(&self, plugin: &str) -> PathBuf {
        self.root.join(plugin)
    }

    pub fn marker_path(&self, plugin: &str) -> PathBuf {
        self.plugin_dir(plugin).join(PACKAGE_MARKER)
    }

    pub fn module_path(&self, plugin: &str, module_file: &OsStr) -> PathBuf {
        self.plugin_dir(plugin).join(module_file)
    }
}

/// Outcome of a structure check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// Invalid, and the error was logged by this check
    Reported,
    /// Invalid in the same way as when it was last reported
    Suppressed,
}

impl Validation {
    pub fn is_valid(self) -> bool {
        self == Validation::Valid
    }
}

/// Decides whether a candidate directory is a well-formed plugin.
#[derive(Debug, Clone)]
pub struct StructureValidator {
    layout: PluginLayout,
}

impl StructureValidator {
    pub fn new(layout: PluginLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PluginLayout {
        &self.layout
    }

    /// Check that the marker and the module file exist.
    ///
    /// A failing record is marked Invalid. An error is logged the first time a
    /// given fault is seen; it is logged again once the fault changes, either
    /// because other files are missing or because the plugin directory was
    /// modified. A valid structure clears the reported fault.
    pub fn validate(&self, record: &mut PluginRecord, module_file: &OsStr, logger: &dyn Logger) -> Validation {
        let plugin_dir = self.layout.plugin_dir(record.name());
        let marker = self.layout.marker_path(record.name());
        let module = self.layout.module_path(record.name(), module_file);

        let missing: Vec<PathBuf> = [&marker, &module]
            .into_iter()
            .filter(|path| !path.is_file())
            .cloned()
            .collect();
        if missing.is_empty() {
            record.set_reported_fault(None);
            return Validation::Valid;
        }

        record.mark_invalid(InvalidReason::Structure);
        let fault = StructureFault {
            missing,
            dir_mtime: modified(&plugin_dir).ok(),
        };
        if record.reported_fault() == Some(&fault) {
            return Validation::Suppressed;
        }

        let err = PluginSystemError::InvalidStructure {
            plugin: record.name().to_string(),
            expected: vec![marker, module],
        };
        logger.error(&err.to_string());
        record.set_reported_fault(Some(fault));
        Validation::Reported
    }
}
