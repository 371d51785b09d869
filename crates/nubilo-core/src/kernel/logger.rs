use log::Level;

use crate::kernel::constants::PLUGIN_LOG_TARGET;

/// Leveled sink for supervisor progress and error events.
///
/// The supervisor receives its logger at construction instead of writing to
/// a global, which lets embedders route plugin diagnostics separately and
/// lets tests assert on what was reported.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warning(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Forwards to the `log` facade under the `nubilo::plugins` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLogger;

impl Logger for FacadeLogger {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: PLUGIN_LOG_TARGET, level, "{}", message);
    }
}
