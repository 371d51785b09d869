//! Process-wide log output for the `nubilo` binary.
//!
//! `log` records from `nubilo-core` and from plugins are bridged into a
//! `tracing` fmt subscriber that appends to the configured logfile.
use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Install the global subscriber.
///
/// The level comes from `RUST_LOG` (default `info`), or is forced to `debug`.
/// When the logfile cannot be opened an error is printed and output goes to
/// stderr instead.
pub fn init(logfile: &Path, colored: bool, debug: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let writer = match OpenOptions::new().create(true).append(true).open(logfile) {
        Ok(file) => BoxMakeWriter::new(Arc::new(file)),
        Err(e) => {
            eprintln!(
                "Error: unable to open logfile {}: {}. Logging to stderr instead.",
                logfile.display(),
                e
            );
            BoxMakeWriter::new(std::io::stderr)
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(colored)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}
