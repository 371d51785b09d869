//! # Nubilo Core Configuration
//!
//! Layered application configuration.
//!
//! [`NubiloConfig`] starts from built-in defaults. A [`ConfigLoader`] then
//! applies each configured file in order, later layers overriding earlier ones
//! key by key. The default layers are the installation config next to the
//! executable and the per-user config at `~/.nubilo/nubilo.toml`; missing
//! files are skipped.
//!
//! Files are parsed according to their extension (see [`ConfigFormat`]).
//! Keys may carry a `nubilo_` prefix, which is stripped before merging, so
//! `nubilo_listen_port = 9000` and `listen_port = 9000` are equivalent.
pub mod error;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::kernel::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_KEY_PREFIX, DEFAULT_COOKIE_EXPIRES_DAYS,
    DEFAULT_LISTEN_PORT, DEFAULT_LOGFILE, DEFAULT_PLUGINS_DIR, DEFAULT_POLL_INTERVAL_SECS,
};
use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Effective application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NubiloConfig {
    /// Port the web front end listens on
    pub listen_port: u16,
    /// Directory watched by the plugin supervisor
    pub plugin_directory: PathBuf,
    /// Seconds between two reconciliation passes
    pub plugin_poll_interval: u64,
    /// File the binary appends its log to
    pub logfile: PathBuf,
    /// Login cookie lifetime, in days
    pub cookie_expires: u32,
    /// Whether log output carries ANSI colours
    pub colored_log: bool,
}

impl Default for NubiloConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            plugin_directory: PathBuf::from(DEFAULT_PLUGINS_DIR),
            plugin_poll_interval: DEFAULT_POLL_INTERVAL_SECS,
            logfile: PathBuf::from(DEFAULT_LOGFILE),
            cookie_expires: DEFAULT_COOKIE_EXPIRES_DAYS,
            colored_log: false,
        }
    }
}

/// Raw key/value contents of one configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    values: HashMap<String, serde_json::Value>,
}

impl ConfigLayer {
    /// Parse a layer from text in the given format.
    ///
    /// `origin` is only used for error messages.
    pub fn parse(data: &str, format: ConfigFormat, origin: &Path) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: origin.to_path_buf(),
            format: format.extension().to_string(),
            message,
        };

        let raw: HashMap<String, serde_json::Value> = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_error(e.to_string()))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                // An empty YAML document is a valid, empty layer
                if data.trim().is_empty() {
                    HashMap::new()
                } else {
                    serde_yaml::from_str(data).map_err(|e| parse_error(e.to_string()))?
                }
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_error(e.to_string()))?,
        };

        let values = raw
            .into_iter()
            .map(|(key, value)| {
                let key = key
                    .strip_prefix(CONFIG_KEY_PREFIX)
                    .map(str::to_string)
                    .unwrap_or(key);
                (key, value)
            })
            .collect();

        Ok(Self { values })
    }

    /// Read and parse a layer from disk, picking the format from the extension.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let data = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(e, "read_to_string", path.to_path_buf()))?;
        Self::parse(&data, format, path)
    }

    /// Get a value by its (unprefixed) key
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds a [`NubiloConfig`] from defaults and an ordered list of files.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    layers: Vec<PathBuf>,
}

impl ConfigLoader {
    /// A loader with no file layers; `load` returns the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader with the installation and per-user layers, in that order.
    pub fn with_default_layers() -> Self {
        let mut loader = Self::new();
        if let Some(path) = Self::installation_config_path() {
            loader = loader.layer(path);
        }
        if let Some(path) = Self::user_config_path() {
            loader = loader.layer(path);
        }
        loader
    }

    /// `nubilo.toml` next to the running executable.
    pub fn installation_config_path() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
    }

    /// `~/.nubilo/nubilo.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Append a layer; it overrides every layer added before it.
    pub fn layer(mut self, path: impl Into<PathBuf>) -> Self {
        self.layers.push(path.into());
        self
    }

    pub fn layers(&self) -> &[PathBuf] {
        &self.layers
    }

    pub fn load(&self) -> Result<NubiloConfig, ConfigError> {
        let defaults = serde_json::to_value(NubiloConfig::default())
            .map_err(|e| ConfigError::Schema(e.to_string()))?;
        let mut merged: serde_json::Map<String, serde_json::Value> = match defaults {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(ConfigError::Schema(format!(
                    "defaults serialized to a non-object value: {}",
                    other
                )));
            }
        };

        for path in &self.layers {
            if !path.is_file() {
                log::debug!("Skipping missing configuration layer {}", path.display());
                continue;
            }
            let layer = ConfigLayer::read(path)?;
            log::debug!(
                "Applying configuration layer {} ({} keys)",
                path.display(),
                layer.len()
            );
            merged.extend(layer.values);
        }

        serde_json::from_value(serde_json::Value::Object(merged))
            .map_err(|e| ConfigError::Schema(e.to_string()))
    }
}
