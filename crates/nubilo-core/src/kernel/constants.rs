/// Application name
pub const APP_NAME: &str = "Nubilo";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-user configuration directory name, relative to the home directory
pub const CONFIG_DIR_NAME: &str = ".nubilo";

/// Configuration file name used for both the installation and the user layer
pub const CONFIG_FILE_NAME: &str = "nubilo.toml";

/// Prefix accepted (and stripped) on configuration keys, e.g. `nubilo_listen_port`
pub const CONFIG_KEY_PREFIX: &str = "nubilo_";

/// Default plugins directory
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Default poll interval of the plugin supervisor, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default HTTP listen port
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Default logfile location
pub const DEFAULT_LOGFILE: &str = "/var/log/nubilo.log";

/// Default login cookie lifetime, in days
pub const DEFAULT_COOKIE_EXPIRES_DAYS: u32 = 1;

/// Log target used for all supervisor events
pub const PLUGIN_LOG_TARGET: &str = "nubilo::plugins";
