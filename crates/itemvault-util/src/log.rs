//! Logging setup using tracing.
//!
//! This module provides consistent logging configuration across itemvault.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a log level from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Log level for itemvault crates.
    pub level: LogLevel,
    /// Whether to include file/line info in logs.
    pub include_location: bool,
    /// Log file to append to. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> String {
        let level = self.level.as_str();
        format!(
            "itemvault={level},itemvault_core={level},itemvault_archive={level},itemvault_source={level}"
        )
    }
}

/// Initialize logging with the given configuration.
///
/// This should be called once at application startup. Returns the log file
/// path when logging to a file. If the file cannot be opened, logging falls
/// back to stderr.
pub fn init(config: LogConfig) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    let subscriber = tracing_subscriber::registry().with(filter);

    if let Some(path) = config.file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Warning: Could not create log directory: {e}");
            }
        }

        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => {
                let fmt_layer = fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_writer(std::sync::Mutex::new(file));
                subscriber.with(fmt_layer).init();
                return Some(path);
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file: {e}");
            }
        }
    }

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_writer(std::io::stderr);
    subscriber.with(fmt_layer).init();

    None
}
