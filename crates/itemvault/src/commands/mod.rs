//! Command handlers for the itemvault CLI.

pub mod archive;
pub mod history;
pub mod logging;

pub use archive::*;
pub use history::*;
pub use logging::*;
