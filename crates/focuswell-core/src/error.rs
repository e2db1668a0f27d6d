//! Core error types for focuswell-core.
//!
//! Nothing in a running session is fatal: callers log these and carry on.
//! The hierarchy exists so storage, config and audio backends can report
//! what went wrong without string-typing it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focuswell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Preference storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audio backend errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Preference storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Audio backend errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device could be opened
    #[error("No audio output device: {0}")]
    NoDevice(String),

    /// The track file could not be opened or decoded
    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Playback was refused by the backend
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Minute value that is not one of the configured presets
    #[error("{minutes} minutes is not a configured preset")]
    UnknownPreset { minutes: u32 },

    /// Track identifier that is not one of the ambient tracks
    #[error("unknown ambient track: {0}")]
    UnknownTrack(String),

    /// Theme name other than light or dark
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_wraps_into_core_error() {
        let err: CoreError = StorageError::Locked.into();
        assert_eq!(err.to_string(), "Storage error: Database is locked");
    }

    #[test]
    fn unknown_preset_message_names_minutes() {
        let err = ValidationError::UnknownPreset { minutes: 7 };
        assert_eq!(err.to_string(), "7 minutes is not a configured preset");
    }
}
