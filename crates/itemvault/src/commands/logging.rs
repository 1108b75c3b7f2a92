//! Logging initialization.

use itemvault_util::{log, LogConfig, LogLevel};
use std::path::PathBuf;

/// Initialize logging from the command line and config.
///
/// `--verbose` wins over the configured level. Logs go to stderr unless a
/// log file is given; `RUST_LOG` overrides both.
pub fn init_logging(
    verbose: bool,
    log_file: Option<PathBuf>,
    configured: Option<LogLevel>,
) -> Option<PathBuf> {
    let level = if verbose {
        LogLevel::Debug
    } else {
        configured.unwrap_or_default()
    };

    log::init(LogConfig {
        level,
        include_location: verbose,
        file: log_file,
    })
}
