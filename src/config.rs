//! Configuration management for Hestia
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files with support for an environment override of
//! the config path.

use crate::error::{HestiaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote thermostat service connection configuration
    pub server: ServerConfig,

    /// Session storage and login defaults
    pub session: SessionConfig,

    /// Temperature cache behavior
    pub cache: CacheConfig,

    /// Schedule and override behavior
    pub schedule: ScheduleConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

/// Remote service connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the thermostat service, without a trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Session storage and login defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path of the durable session store file
    pub store_path: String,

    /// Username submitted with the login form
    pub username: String,
}

/// Temperature cache behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Minimum elapsed time between full temperature sweeps
    pub debounce_ms: u64,
}

/// Schedule and override behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// How far in the future a requested override ends, in seconds
    pub advance_duration_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file or log directory
    pub file: String,

    /// Console-specific level override
    pub console_level: Option<String>,

    /// File-specific level override
    pub file_level: Option<String>,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: "hestia_session.json".to_string(),
            username: "username".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { debounce_ms: 1000 }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            advance_duration_secs: 3600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "hestia.log".to_string(),
            console_level: None,
            file_level: None,
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
            schedule: ScheduleConfig::default(),
            logging: LoggingConfig::default(),
            poll_interval_ms: 5000,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with validation
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("HESTIA_CONFIG") {
            let config = Self::from_file(&path)?;
            config.validate()?;
            return Ok(config);
        }

        let default_paths = [
            "hestia_config.yaml",
            "/data/hestia_config.yaml",
            "/etc/hestia/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                let config = Self::from_file(path)?;
                config.validate()?;
                return Ok(config);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.is_empty() {
            return Err(HestiaError::validation(
                "server.base_url",
                "Base URL cannot be empty",
            ));
        }

        if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            return Err(HestiaError::validation(
                "server.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(HestiaError::validation(
                "server.request_timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.session.store_path.is_empty() {
            return Err(HestiaError::validation(
                "session.store_path",
                "Store path cannot be empty",
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(HestiaError::validation(
                "poll_interval_ms",
                "Must be greater than 0",
            ));
        }

        if self.schedule.advance_duration_secs == 0 {
            return Err(HestiaError::validation(
                "schedule.advance_duration_secs",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}
