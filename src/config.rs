//! Configuration management for policyfinder
//!
//! Configuration is loaded from `./config/policyfinder.toml` when present;
//! otherwise the embedded default template is used. CLI flags override
//! whatever was loaded.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to the working directory
pub const CONFIG_PATH: &str = "./config/policyfinder.toml";

/// Default configuration file content - this is the only place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/policyfinder.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration field '{field}' cannot be empty or zero")]
    EmptyRequired { field: String },

    #[error("Configuration field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub batch: BatchConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Batch processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub parallel_jobs: usize,
    #[serde(default)]
    pub requests_per_second: u32,
    #[serde(default)]
    pub probe_common_paths: bool,
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl AppConfig {
    /// Load configuration from the default path, falling back to the
    /// embedded defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_PATH);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            let config: AppConfig = toml::from_str(DEFAULT_CONFIG)?;
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }
        if self.http.max_body_bytes == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.max_body_bytes".to_string(),
            });
        }
        if self.batch.parallel_jobs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "batch.parallel_jobs".to_string(),
            });
        }
        if self.batch.parallel_jobs > 100 {
            return Err(ConfigError::OutOfRange {
                field: "batch.parallel_jobs".to_string(),
                reason: "cannot exceed 100 to avoid overwhelming remote servers".to_string(),
            });
        }
        Ok(())
    }

    /// Create the default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG)?;
        Ok(path.to_path_buf())
    }
}
