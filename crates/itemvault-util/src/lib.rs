//! Shared utilities for itemvault.
//!
//! This crate provides common utilities used across the itemvault workspace:
//! - Logging setup with tracing
//! - Platform config directory

pub mod log;
pub mod path;

pub use log::{LogConfig, LogLevel};
