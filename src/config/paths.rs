//! Platform-specific configuration paths.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "WINGSPOT_CONFIG";

/// File name of the config file inside the config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/wingspot/`
/// - macOS: `~/Library/Application Support/wingspot/`
/// - Windows: `%APPDATA%\wingspot\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
///
/// `WINGSPOT_CONFIG` takes precedence over the platform directory.
pub fn config_file_path() -> Result<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}
