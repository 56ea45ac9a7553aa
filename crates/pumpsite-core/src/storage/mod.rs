mod config;
pub mod journal;

pub use config::{CalendarConfig, CatalogConfig, Config, RotationConfig};
pub use journal::{EventStore, Journal, Snapshot};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory.
///
/// `PUMPSITE_DATA_DIR` wins when set. Otherwise `~/.config/pumpsite[-dev]/`
/// based on `PUMPSITE_ENV` (set `PUMPSITE_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("PUMPSITE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("PUMPSITE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pumpsite-dev")
            } else {
                base_dir.join("pumpsite")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
