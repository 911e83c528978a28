//! Two log sinks: the console (stderr) and an append-only log file.
//!
//! The console shows INFO and up, ERROR only under `--quiet`. The file
//! always gets DEBUG from our own crates so `--debug` can replay a run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::exit_codes::{EXIT_ERROR, EXIT_TABLE_IO};
use crate::CliError;

/// Overrides the file filter, e.g. `READACTOR_LOG=trace`.
pub const LOG_ENV: &str = "READACTOR_LOG";

const FILE_FILTER: &str =
    "warn,readactor=debug,readactor_recon=debug,readactor_io=debug,readactor_wikidata=debug";

pub fn init(log_file: &Path, quiet: bool) -> Result<(), CliError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("cannot open log file {}: {e}", log_file.display()),
            hint: Some("set [log] file in the settings to a writable path".into()),
        })?;

    let console_level = if quiet { LevelFilter::ERROR } else { LevelFilter::INFO };
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(console_level);

    let file_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(FILE_FILTER));
    let file_layer = fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("cannot install logger: {e}"),
            hint: None,
        })
}

/// `--debug`: dump the accumulated log file.
pub fn print_log(log_file: &Path) -> Result<(), CliError> {
    let data = fs::read_to_string(log_file).map_err(|e| CliError {
        code: EXIT_TABLE_IO,
        message: format!("cannot read log file {}: {e}", log_file.display()),
        hint: Some("the log file is created by the first run in this directory".into()),
    })?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(data.as_bytes())
        .and_then(|_| handle.flush())
        .map_err(|e| CliError {
            code: EXIT_ERROR,
            message: e.to_string(),
            hint: None,
        })
}
