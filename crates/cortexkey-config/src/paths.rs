//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/cortexkey/config.toml`
//! - macOS: `~/Library/Application Support/cortexkey/config.toml`
//! - Windows: `%APPDATA%\cortexkey\config.toml`

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used in directory paths.
pub const APP_NAME: &str = "cortexkey";

/// Configuration file name inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path.
pub fn user_config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Resolve which configuration file to load.
///
/// An explicit path always wins, whether or not it exists (a missing
/// explicit file is an error at load time). Otherwise the user config file
/// is returned if it exists, else `None`.
pub fn resolve(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let default = user_config_file();
    default.is_file().then_some(default)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
