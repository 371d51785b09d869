use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::plugin_system::record::{Mtimes, PluginRecord};

/// Tracks plugin changes through the modification times of the plugin
/// directory and its module file.
///
/// Edits to other files inside the plugin directory change neither mtime and
/// go unnoticed; creating, renaming or deleting files does bump the directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeDetector;

impl ChangeDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn observe(&self, plugin_dir: &Path, module_path: &Path) -> io::Result<Mtimes> {
        Ok(Mtimes {
            dir: modified(plugin_dir)?,
            module: modified(module_path)?,
        })
    }

    /// True when either mtime differs from the stored one. A record without
    /// stored mtimes, or files that can no longer be stat'ed, count as changed.
    pub fn has_changed(&self, record: &PluginRecord, plugin_dir: &Path, module_path: &Path) -> bool {
        match (record.mtimes(), self.observe(plugin_dir, module_path)) {
            (Some(stored), Ok(current)) => stored != current,
            _ => true,
        }
    }
}

pub fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
