//! Configuration file model and loading
//!
//! Every field is optional so that a partial file (or no file at all) still
//! loads; callers layer command-line and environment values on top and fall
//! back to compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application directory name under the platform config directory
pub const APP_DIR_NAME: &str = "stj";

/// Config file name inside [`APP_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Region-specific transcription collection URL
    pub endpoint: Option<String>,
    /// Subscription key sent with every service request
    pub subscription_key: Option<String>,
    /// Target locale, e.g. `en-US`
    pub locale: Option<String>,
    /// Audio source URIs to transcribe
    #[serde(default)]
    pub recordings: Vec<String>,
    /// Acoustic/language model identifiers
    #[serde(default)]
    pub models: Vec<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub deadline_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub result_channel: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default config file location for the platform
///
/// Linux: `~/.config/stj/config.toml`, macOS: `~/Library/Application Support/stj/config.toml`,
/// Windows: `%APPDATA%\stj\config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load a TOML config file
///
/// A missing file is not an error: a warning is logged and defaults are
/// returned. An unreadable file is [`Error::Io`]; a malformed one is
/// [`Error::Config`].
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "Config file not found, using defaults"
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Load the config file at `explicit`, or the platform default location
///
/// An explicitly named file must exist; the default location may be absent.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            load_toml_config(path)
        }
        None => match default_config_path() {
            Some(path) => load_toml_config(&path),
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(TomlConfig::default())
            }
        },
    }
}
