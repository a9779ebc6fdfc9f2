mod config;
pub mod database;
pub mod kv;

pub use config::{AppearanceConfig, Config, LoggingConfig, TimerConfig};
pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the Tasodoro data directory, creating it if needed.
///
/// `TASODORO_HOME` overrides the location outright. Otherwise the directory
/// is `~/.config/tasodoro[-dev]/`, chosen by `TASODORO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TASODORO_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TASODORO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tasodoro-dev")
            } else {
                base_dir.join("tasodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
