mod cli; // Command-line definitions
mod logging;

use std::process::ExitCode;
use std::sync::{Arc, PoisonError};

use clap::Parser;
use log::{error, info};
use nubilo_core::kernel::constants::{APP_NAME, APP_VERSION};
use nubilo_core::kernel::{FacadeLogger, MenuEntry};
use nubilo_core::{
    ConfigLoader, HostContext, KernelError, LibraryLoader, Logger, Menu, NubiloConfig,
    PluginSupervisor, SupervisorConfig,
};

use crate::cli::{CliArgs, Commands, PluginCommand};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Commands::Run { plugins } => {
            plugins.apply(&mut config);
            init_logging(&config, args.debug);
            run(config).await
        }
        Commands::Plugin { command } => match command {
            PluginCommand::List { plugins } => {
                plugins.apply(&mut config);
                init_logging(&config, args.debug);
                list_plugins(config).await
            }
        },
        Commands::Config => print_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &CliArgs) -> Result<NubiloConfig, KernelError> {
    let mut loader = ConfigLoader::with_default_layers();
    if let Some(path) = &args.config {
        // Default layers may be absent, an explicit one may not
        if !path.is_file() {
            return Err(KernelError::Other(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        loader = loader.layer(path);
    }
    Ok(loader.load()?)
}

fn init_logging(config: &NubiloConfig, debug: bool) {
    if let Err(e) = logging::init(&config.logfile, config.colored_log, debug) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }
}

fn build_supervisor(config: &NubiloConfig) -> Result<PluginSupervisor, KernelError> {
    let supervisor_config = SupervisorConfig::from_config(config)?;
    let logger: Arc<dyn Logger> = Arc::new(FacadeLogger);
    let context = HostContext::new().with_logger(logger.clone()).into_shared();
    let supervisor = PluginSupervisor::new(supervisor_config, LibraryLoader::new(), logger, context)?;
    Ok(supervisor)
}

async fn run(config: NubiloConfig) -> Result<(), KernelError> {
    let supervisor = build_supervisor(&config)?;
    info!("{} {} starting", APP_NAME, APP_VERSION);
    let handle = supervisor.start();

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| KernelError::Other(format!("failed to listen for Ctrl-C: {}", e)))?;

    info!("Shutting down {}...", APP_NAME);
    handle.stop().await?;
    info!("{} stopped", APP_NAME);
    Ok(())
}

async fn list_plugins(config: NubiloConfig) -> Result<(), KernelError> {
    let supervisor = build_supervisor(&config)?;
    let root = supervisor.config().plugin_directory_path.clone();

    let (mut supervisor, snapshot) = tokio::task::spawn_blocking(move || {
        let mut supervisor = supervisor;
        supervisor.reconcile();
        let snapshot = supervisor.snapshot();
        (supervisor, snapshot)
    })
    .await
    .map_err(|e| KernelError::Other(format!("plugin pass failed: {}", e)))?;

    println!("Plugins in {}:", root.display());
    if snapshot.is_empty() {
        println!("  No plugins found.");
    } else {
        for (name, status) in snapshot.iter() {
            println!("  - {}: {}", name, status);
        }
    }

    {
        let context = supervisor.context().read().unwrap_or_else(PoisonError::into_inner);
        if !context.menu().is_empty() {
            println!("Menu:");
            print_menu(context.menu(), 2);
        }
    }

    tokio::task::spawn_blocking(move || supervisor.unload_all())
        .await
        .map_err(|e| KernelError::Other(format!("unloading plugins failed: {}", e)))?;
    Ok(())
}

fn print_menu(menu: &Menu, indent: usize) {
    for (app, entries) in menu.iter() {
        println!("{:indent$}{}", "", app, indent = indent);
        for entry in entries {
            match entry {
                MenuEntry::Item { label, url } => {
                    println!("{:indent$}- {} ({})", "", label, url, indent = indent + 2)
                }
                MenuEntry::Submenu { label, menu } => {
                    println!("{:indent$}- {}", "", label, indent = indent + 2);
                    print_menu(menu, indent + 4);
                }
            }
        }
    }
}

fn print_config(config: &NubiloConfig) -> Result<(), KernelError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| KernelError::Other(format!("failed to render configuration: {}", e)))?;
    print!("{}", rendered);
    Ok(())
}
