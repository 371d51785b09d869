//! Application menu that plugins extend from their `load` entry point.
use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("app name must be provided and not empty")]
    EmptyAppName,
}

/// A single entry registered under an app name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item { label: String, url: String },
    Submenu { label: String, menu: Menu },
}

impl MenuEntry {
    pub fn label(&self) -> &str {
        match self {
            MenuEntry::Item { label, .. } | MenuEntry::Submenu { label, .. } => label,
        }
    }
}

/// Menu holder for the application.
///
/// Entries are grouped by app name, which is normally the plugin name, so a
/// plugin can drop everything it registered with [`Menu::remove_app`] when it
/// is unloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    apps: BTreeMap<String, Vec<MenuEntry>>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single menu item under `app`.
    pub fn add_item(
        &mut self,
        app: &str,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<(), MenuError> {
        let entries = self.entries_for(app)?;
        entries.push(MenuEntry::Item {
            label: label.into(),
            url: url.into(),
        });
        Ok(())
    }

    /// Adds a sub-menu under `app`.
    pub fn add_menu(&mut self, app: &str, label: impl Into<String>, menu: Menu) -> Result<(), MenuError> {
        let entries = self.entries_for(app)?;
        entries.push(MenuEntry::Submenu {
            label: label.into(),
            menu,
        });
        Ok(())
    }

    /// Removes every entry registered under `app`.
    pub fn remove_app(&mut self, app: &str) -> Option<Vec<MenuEntry>> {
        self.apps.remove(app)
    }

    pub fn entries(&self, app: &str) -> Option<&[MenuEntry]> {
        self.apps.get(app).map(Vec::as_slice)
    }

    /// App names in sorted order.
    pub fn apps(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MenuEntry])> {
        self.apps.iter().map(|(app, entries)| (app.as_str(), entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    fn entries_for(&mut self, app: &str) -> Result<&mut Vec<MenuEntry>, MenuError> {
        if app.trim().is_empty() {
            return Err(MenuError::EmptyAppName);
        }
        Ok(self.apps.entry(app.to_string()).or_default())
    }
}
