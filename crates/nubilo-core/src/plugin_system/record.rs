//! Per-plugin state kept by the supervisor.
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

use crate::plugin_system::loader::ResolvedPlugin;

/// Last observed modification times of a plugin's directory and module file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mtimes {
    pub dir: SystemTime,
    pub module: SystemTime,
}

/// A structural problem as it looked when it was last reported.
///
/// The same fault is reported once. A different set of missing files, or any
/// change to the plugin directory, makes it a new fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureFault {
    pub missing: Vec<PathBuf>,
    pub dir_mtime: Option<SystemTime>,
}

/// Why a plugin is in the `Invalid` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Marker or module file missing. Rechecked every pass.
    Structure,
    /// The module opened but lacks `load` or `unload`.
    MissingEntryPoint,
}

#[derive(Debug)]
pub enum PluginState {
    Discovered,
    Invalid(InvalidReason),
    ValidUnloaded,
    Loaded(ResolvedPlugin),
}

/// Plain status of a plugin, as exposed outside the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PluginStatus {
    Discovered,
    Invalid,
    ValidUnloaded,
    Loaded,
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginStatus::Discovered => "Discovered",
            PluginStatus::Invalid => "Invalid",
            PluginStatus::ValidUnloaded => "ValidUnloaded",
            PluginStatus::Loaded => "Loaded",
        };
        f.write_str(name)
    }
}

impl PluginState {
    pub fn status(&self) -> PluginStatus {
        match self {
            PluginState::Discovered => PluginStatus::Discovered,
            PluginState::Invalid(_) => PluginStatus::Invalid,
            PluginState::ValidUnloaded => PluginStatus::ValidUnloaded,
            PluginState::Loaded(_) => PluginStatus::Loaded,
        }
    }
}

#[derive(Debug)]
pub struct PluginRecord {
    name: String,
    state: PluginState,
    mtimes: Option<Mtimes>,
    reported_fault: Option<StructureFault>,
}

impl PluginRecord {
    /// A freshly sighted plugin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: PluginState::Discovered,
            mtimes: None,
            reported_fault: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &PluginState {
        &self.state
    }

    pub fn status(&self) -> PluginStatus {
        self.state.status()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, PluginState::Loaded(_))
    }

    pub fn mtimes(&self) -> Option<Mtimes> {
        self.mtimes
    }

    /// True while a structural error has been reported and not yet resolved.
    pub fn suppresses_repeat_error(&self) -> bool {
        self.reported_fault.is_some()
    }

    pub fn reported_fault(&self) -> Option<&StructureFault> {
        self.reported_fault.as_ref()
    }

    pub(crate) fn set_reported_fault(&mut self, fault: Option<StructureFault>) {
        self.reported_fault = fault;
    }

    pub(crate) fn record_mtimes(&mut self, mtimes: Mtimes) {
        self.mtimes = Some(mtimes);
    }

    pub(crate) fn mark_invalid(&mut self, reason: InvalidReason) {
        self.state = PluginState::Invalid(reason);
    }

    pub(crate) fn mark_valid_unloaded(&mut self) {
        self.state = PluginState::ValidUnloaded;
    }

    pub(crate) fn mark_loaded(&mut self, resolved: ResolvedPlugin) {
        self.state = PluginState::Loaded(resolved);
    }

    /// Move a loaded plugin's entry points out, leaving the record ValidUnloaded.
    pub(crate) fn take_loaded(&mut self) -> Option<ResolvedPlugin> {
        match std::mem::replace(&mut self.state, PluginState::ValidUnloaded) {
            PluginState::Loaded(resolved) => Some(resolved),
            other => {
                self.state = other;
                None
            }
        }
    }
}

/// Point-in-time view of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    plugins: BTreeMap<String, PluginStatus>,
}

impl RegistrySnapshot {
    pub fn get(&self, name: &str) -> Option<PluginStatus> {
        self.plugins.get(name).copied()
    }

    /// Names of loaded plugins, sorted.
    pub fn loaded(&self) -> Vec<&str> {
        self.plugins
            .iter()
            .filter(|(_, status)| **status == PluginStatus::Loaded)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PluginStatus)> {
        self.plugins.iter().map(|(name, status)| (name.as_str(), *status))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl<'a> FromIterator<&'a PluginRecord> for RegistrySnapshot {
    fn from_iter<I: IntoIterator<Item = &'a PluginRecord>>(records: I) -> Self {
        Self {
            plugins: records
                .into_iter()
                .map(|record| (record.name().to_string(), record.status()))
                .collect(),
        }
    }
}
