//! Default paths for cvm-session
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/cvm/config.toml` or `~/.config/cvm/config.toml`
//! - Data: `$XDG_DATA_HOME/cvm` or `~/.local/share/cvm`

use std::path::PathBuf;

/// Environment variable for overriding the config file
pub const CVM_CONFIG_ENV: &str = "CVM_CONFIG";

/// Environment variable for overriding the data directory
pub const CVM_DATA_DIR_ENV: &str = "CVM_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "cvm";

/// Credential database filename within the data directory
pub const CREDENTIALS_DB: &str = "credentials.db";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/cvm/config.toml`
/// 2. `~/.config/cvm/config.toml`
/// 3. `/tmp/cvm/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/tmp").join(APP_DIR).join("config.toml")
}

/// Get the default data directory, ignoring `CVM_DATA_DIR`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
