use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use crate::plugin_system::error::PluginSystemError;

/// Subdirectories found under the plugin root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginScan {
    /// Candidate plugin names, sorted
    pub names: BTreeSet<String>,
    /// Directories whose name is not valid UTF-8 and so cannot be a plugin name
    pub skipped: BTreeSet<OsString>,
}

/// List the immediate subdirectories of `root`.
///
/// Plain files are ignored, symlinks are followed. Reporting the skipped
/// names is left to the caller.
pub fn scan_plugin_root(root: &Path) -> Result<PluginScan, PluginSystemError> {
    let entries = fs::read_dir(root)
        .map_err(|e| PluginSystemError::io(e, "read_dir", root.to_path_buf()))?;

    let mut scan = PluginScan::default();
    for entry in entries {
        let entry = entry.map_err(|e| PluginSystemError::io(e, "read_dir_entry", root.to_path_buf()))?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                scan.names.insert(name);
            }
            Err(raw) => {
                scan.skipped.insert(raw);
            }
        }
    }
    Ok(scan)
}
