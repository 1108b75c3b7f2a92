//! Content-addressed snapshot archive for itemvault.
//!
//! This crate keeps an append-only history of captures per item and only
//! stores a capture when it differs from the item's latest snapshot:
//! - Stage the payload in a per-item slot under `archive/tmp/`
//! - Fingerprint the staged file (SHA-256)
//! - Compare against the fingerprint of the latest committed snapshot
//! - Rename into `archive/<item_id>/<stamp>.<ext>`, or discard as a duplicate
//!
//! # Example
//!
//! ```no_run
//! use itemvault_archive::{Archiver, ArchiverConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let archiver = Archiver::new("/var/lib/itemvault", ArchiverConfig::default());
//!
//! let outcome = archiver.archive("c31146ae5a7d4299", br#"{"title":"Parcels"}"#).await?;
//! match outcome.committed_path() {
//!     Some(path) => println!("archived to {}", path.display()),
//!     None => println!("no update"),
//! }
//! # Ok(())
//! # }
//! ```

mod archiver;
mod error;
mod hash;
pub mod layout;
mod snapshot;
mod staging;
mod store;

pub use archiver::{Archiver, ArchiverConfig};
pub use error::{ArchiveError, ArchiveResult};
pub use hash::Fingerprint;
pub use layout::ArchiveLayout;
pub use snapshot::{ArchiveOutcome, ArchivedSnapshot, SnapshotStamp};
pub use staging::{StagedSnapshot, StagingArea};
pub use store::ArchiveStore;
