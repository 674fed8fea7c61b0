//! Configuration file management.
//!
//! Handles loading TOML configuration files and writing the default one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# quote-sync configuration
# Auto-generated - edit as needed

[sync]
# Interval between syncs in seconds (default: 30)
interval_secs = 30

# Whether periodic sync is enabled
enabled = true

# Timeout for each remote request in seconds
timeout_secs = 10

[remote]
# Endpoint returning a JSON array of objects with a "title" field
endpoint = "https://jsonplaceholder.typicode.com/posts"

# Endpoint receiving {"quotes": [...]} after each sync
push_endpoint = "https://jsonplaceholder.typicode.com/posts"

# Number of remote items turned into quotes
fetch_limit = 5

# Category given to fetched quotes
category = "ServerSync"

[paths]
# Custom data directory (optional, defaults to ~/.quote-sync)
# data_dir = "/custom/path"
"#;

/// Load configuration from `path`, or the default location, or defaults.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = path.map_or_else(config_file_path, Path::to_path_buf);

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        if path.is_some() {
            tracing::warn!(path = %config_path.display(), "Config file not found, using defaults");
        }
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create default configuration file if it doesn't exist.
///
/// Returns `true` when a new file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Get the path to the default configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default_data_dir().join("config.toml")
}
