mod config;
pub mod database;

pub use config::{
    BreathingConfig, ChimeConfig, Config, SoundConfig, TimerConfig, UiConfig,
};
pub use database::Database;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::StorageError;

/// Durable string key-value storage for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Non-durable store, for tests and hosts without a disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Returns the directory holding the database and config file.
///
/// `FOCUSWELL_HOME` wins when set. Otherwise `~/.config/focuswell[-dev]/`,
/// with `FOCUSWELL_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FOCUSWELL_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FOCUSWELL_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("focuswell-dev")
            } else {
                base_dir.join("focuswell")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
