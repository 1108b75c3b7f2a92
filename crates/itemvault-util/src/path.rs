//! Path utilities.
//!
//! Platform directories used by itemvault.

use std::path::PathBuf;

/// Get the itemvault configuration directory.
///
/// On Unix, prefers `~/.config/itemvault` when it exists, which is where most
/// CLI tools keep their config, then falls back to the platform directory:
/// - `$XDG_CONFIG_HOME/itemvault` on Linux
/// - `~/Library/Application Support/itemvault` on macOS
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        if let Some(home) = dirs::home_dir() {
            let xdg_config = home.join(".config").join("itemvault");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }
    }

    dirs::config_dir().map(|p| p.join("itemvault"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        if let Some(dir) = config_dir() {
            assert!(dir.ends_with("itemvault"));
        }
    }
}
