use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nubilo_core::NubiloConfig;

/// Nubilo: a small web host with hot-reloadable plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Extra configuration file, applied on top of the installation and user configs
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Supervise the plugin directory until interrupted
    Run {
        #[command(flatten)]
        plugins: PluginOptions,
    },
    /// Inspect plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// Run one reconciliation pass and list every plugin with its state
    List {
        #[command(flatten)]
        plugins: PluginOptions,
    },
}

/// Command-line overrides for the plugin settings of the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct PluginOptions {
    /// Directory to watch for plugins
    #[arg(long, value_name = "DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Seconds between two passes over the plugin directory
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,
}

impl PluginOptions {
    pub fn apply(&self, config: &mut NubiloConfig) {
        if let Some(dir) = &self.plugin_dir {
            config.plugin_directory = dir.clone();
        }
        if let Some(secs) = self.poll_interval {
            config.plugin_poll_interval = secs;
        }
    }
}
