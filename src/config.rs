use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::parser::ScanMode;

/// Suricata's default EVE output location.
pub const DEFAULT_LOG_PATH: &str = "/var/log/suricata/eve.json";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_WEBHOOK_KEY: &str = "TINES_WEBHOOK_URL";

/// Everything a run needs to know up front.
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_path: PathBuf,
    pub config_path: PathBuf,
    pub webhook_key_name: String,
    pub scan_mode: ScanMode,
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            webhook_key_name: DEFAULT_WEBHOOK_KEY.to_string(),
            scan_mode: ScanMode::default(),
            dry_run: false,
        }
    }
}

pub fn read_config(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject(path.to_path_buf())),
    }
}

/// Returns the webhook URL stored under `key`, or `None` when the file or key is missing.
/// Failures are reported here and never returned to the caller.
pub fn load_webhook_url(path: &Path, key: &str) -> Option<String> {
    let config = match read_config(path) {
        Ok(config) => config,
        Err(e @ ConfigError::NotFound(_)) => {
            warn!("{}", e);
            return None;
        }
        Err(e) => {
            warn!("Error loading webhook URL: {}", e);
            return None;
        }
    };

    match config.get(key) {
        Some(Value::String(url)) => {
            debug!("loaded {} from {}", key, path.display());
            Some(url.clone())
        }
        Some(other) => {
            warn!("Error loading webhook URL: {} is not a string ({})", key, other);
            None
        }
        None => None,
    }
}
