use std::fmt;
use std::sync::{Arc, RwLock};

use crate::kernel::extensions::ExtensionRegistry;
use crate::kernel::logger::{FacadeLogger, Logger};
use crate::kernel::menu::Menu;

/// The host application as seen by a plugin.
///
/// A `&mut HostContext` is passed to every `load` and `unload` call. Whatever
/// a plugin registers during `load` it is expected to remove during `unload`.
///
/// Plugins log through [`HostContext::logger`]. A plugin library links its
/// own copy of the `log` crate, which the host never initializes, so the
/// `log` macros called from plugin code go nowhere.
pub struct HostContext {
    menu: Menu,
    extensions: ExtensionRegistry,
    logger: Arc<dyn Logger>,
}

/// Context shared between the supervisor and the host's request handlers.
///
/// The supervisor holds the write lock only for the duration of a single
/// entry-point call; readers get an eventually consistent view.
pub type SharedContext = Arc<RwLock<HostContext>>;

impl HostContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(extensions: ExtensionRegistry) -> Self {
        Self {
            extensions,
            ..Self::default()
        }
    }

    /// Replace the logger handed to plugins.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    /// Wraps the context for sharing with a supervisor.
    pub fn into_shared(self) -> SharedContext {
        Arc::new(RwLock::new(self))
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            menu: Menu::new(),
            extensions: ExtensionRegistry::new(),
            logger: Arc::new(FacadeLogger),
        }
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("menu", &self.menu)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}
