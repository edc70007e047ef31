pub mod config;
pub mod database;
mod store;

pub use config::Config;
pub use database::Database;
pub use store::{keys, MemoryStore, SettingsStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/prayertrack[-dev]/` based on PRAYERTRACK_ENV.
///
/// Set PRAYERTRACK_ENV=dev to use the development data directory, or
/// PRAYERTRACK_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("PRAYERTRACK_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PRAYERTRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("prayertrack-dev")
            } else {
                base_dir.join("prayertrack")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
