//! Configuration management for earnings-agent
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! A `Config` is built once at startup and handed to each component; nothing
//! reads the environment after that.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// File name of the idempotency index, relative to the data directory
pub const INDEX_FILE_NAME: &str = ".ingest_index.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage layout
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ingest limits and policy
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Per-phase network timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Retry and backoff
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory holding `raw/`, `parsed/` and the index file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Ingest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum document size in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Allowed MIME types (parameters are ignored when matching)
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,

    /// Seconds a successful fetch is served from the index
    #[serde(default = "default_idempotency_ttl")]
    pub idempotency_ttl_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Network timeouts, in (fractional) seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_secs: f64,

    #[serde(default = "default_read_timeout")]
    pub read_secs: f64,

    #[serde(default = "default_write_timeout")]
    pub write_secs: f64,

    #[serde(default = "default_pool_timeout")]
    pub pool_secs: f64,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; the n-th wait is `base * 2^(n-1)`
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_backoff_min_ms")]
    pub backoff_min_ms: u64,

    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            allowed_content_types: default_allowed_content_types(),
            idempotency_ttl_secs: default_idempotency_ttl(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_timeout(),
            read_secs: default_read_timeout(),
            write_secs: default_write_timeout(),
            pool_secs: default_pool_timeout(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_min_ms: default_backoff_min_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs_f64(self.connect_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs_f64(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs_f64(self.write_secs)
    }

    pub fn pool(&self) -> Duration {
        Duration::from_secs_f64(self.pool_secs)
    }

    /// Bound on getting a request out and its response headers back:
    /// pool acquisition, connect, write and the first read.
    pub fn dispatch(&self) -> Duration {
        self.pool() + self.connect() + self.write() + self.read()
    }
}

impl Config {
    /// Get the default base directory for earnings-agent (~/.earnings-agent)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".earnings-agent")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` (or the default location), falling back
    /// to defaults when no file exists
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            debug!("No config file found, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        info!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Directory of archived documents (`{data_dir}/raw`)
    pub fn raw_dir(&self) -> PathBuf {
        self.storage.data_dir.join("raw")
    }

    /// Directory of baseline snapshots (`{data_dir}/parsed`)
    pub fn parsed_dir(&self) -> PathBuf {
        self.storage.data_dir.join("parsed")
    }

    /// Location of the idempotency index
    pub fn index_file(&self) -> PathBuf {
        self.storage.data_dir.join(INDEX_FILE_NAME)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ingest.max_bytes == 0 {
            return Err(Error::Config("ingest.max_bytes must be positive".to_string()));
        }

        if self.ingest.allowed_content_types.is_empty() {
            return Err(Error::Config(
                "ingest.allowed_content_types must not be empty".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be >= 1".to_string()));
        }

        if self.retry.backoff_min_ms > self.retry.backoff_max_ms {
            return Err(Error::Config(
                "retry.backoff_min_ms must be <= retry.backoff_max_ms".to_string(),
            ));
        }

        let timeouts = [
            ("timeouts.connect_secs", self.timeouts.connect_secs),
            ("timeouts.read_secs", self.timeouts.read_secs),
            ("timeouts.write_secs", self.timeouts.write_secs),
            ("timeouts.pool_secs", self.timeouts.pool_secs),
        ];
        for (name, value) in timeouts {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!("{} must be positive", name)));
            }
        }

        Ok(())
    }
}
