//! History command handler.

use itemvault_archive::{ArchiveLayout, ArchiveStore};
use itemvault_core::Config;
use std::path::Path;

/// Handle the history command: list an item's snapshots, oldest first.
pub async fn handle_history(item_id: &str, dir: &Path, config: &Config) -> anyhow::Result<()> {
    let store = ArchiveStore::new(ArchiveLayout::new(dir, config.extension()));
    let snapshots = store.list(item_id).await?;

    if snapshots.is_empty() {
        println!("No snapshots archived for {item_id}.");
        return Ok(());
    }

    println!("{:<15} {:<26} {}", "STAMP", "CAPTURED", "PATH");
    println!("{}", "-".repeat(78));

    for snapshot in &snapshots {
        let captured = snapshot
            .captured_at()
            .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<15} {:<26} {}",
            snapshot.stamp.to_string(),
            captured,
            snapshot.path.display()
        );
    }

    Ok(())
}
