//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::clock::RetryPolicy;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session-start timing defaults.
    pub capture: CaptureDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Session-start timing defaults.
///
/// The defaults are the fixed constants of the start sequence; overriding
/// them is mainly useful for bench rigs and slow virtual cameras.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureDefaults {
    /// Retries allowed after the initial start attempt.
    pub max_start_retries: u32,

    /// Fixed wait between start attempts, in milliseconds.
    pub start_backoff_ms: u64,

    /// Settle wait before the first start attempt, in milliseconds.
    pub start_settle_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "viewfinder=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capture: CaptureDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_start_retries: policy.max_retries,
            start_backoff_ms: policy.backoff.as_millis() as u64,
            start_settle_ms: policy.settle.as_millis() as u64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl CaptureDefaults {
    /// The retry policy these defaults describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_start_retries,
            backoff: Duration::from_millis(self.start_backoff_ms),
            settle: Duration::from_millis(self.start_settle_ms),
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("viewfinder").join("config.json")
}
