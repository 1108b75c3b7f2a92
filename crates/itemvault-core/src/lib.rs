//! Core of itemvault.
//!
//! Ties the pieces together for one run of the tool:
//! - [`Config`]: layered configuration (global file, project file, environment)
//! - [`Backup`]: fetch items from an [`ItemSource`](itemvault_source::ItemSource)
//!   and archive them, reporting what changed

pub mod backup;
pub mod config;
pub mod error;

pub use backup::{Backup, BackupReport};
pub use config::Config;
pub use error::{ConfigError, CoreError, CoreResult};
