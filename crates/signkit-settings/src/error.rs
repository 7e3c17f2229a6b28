//! Error types for the settings crate.
//!
//! [`SettingsError`] covers reading and writing settings files;
//! [`ConfigError`] covers values that fail validation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while locating, reading, or writing a settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("No platform config directory")]
    NoConfigDirectory,

    #[error("Failed to read settings from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write settings to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed TOML settings: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Could not encode settings as TOML: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Invalid settings: {0}")]
    Config(#[from] ConfigError),
}

/// A settings value that cannot be used.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` files are understood.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("'{key}' = {value} is out of range")]
    ValueOutOfRange { key: String, value: String },

    #[error("'{0}' must not be empty")]
    Empty(String),
}

impl ConfigError {
    pub(crate) fn out_of_range(key: &str, value: impl ToString) -> Self {
        ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
