//! Configuration errors.

use std::path::PathBuf;

use cortexkey_core::ParamsError;
use thiserror::Error;

/// Everything that can go wrong loading, saving or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read
    #[error("cannot read settings from {}: {source}", path.display())]
    ReadFile {
        /// Settings file.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// The settings file could not be written
    #[error("cannot write settings to {}: {source}", path.display())]
    WriteFile {
        /// Settings file.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// The settings directory could not be created
    #[error("cannot create settings directory {}: {source}", path.display())]
    CreateDir {
        /// Directory.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// Not valid settings TOML
    #[error("malformed settings: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Settings could not be rendered as TOML
    #[error("cannot render settings: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Settings parse but describe an unusable pipeline
    #[error("invalid settings: {0}")]
    Invalid(#[from] ParamsError),

    /// Feed section out of range
    #[error("invalid feed setting '{field}': {reason}")]
    InvalidFeed {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// [`ConfigError::ReadFile`] for `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::WriteFile`] for `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::CreateDir`] for `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }
}
