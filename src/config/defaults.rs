//! Default values for configuration
//!
//! Each default first looks at its environment variable (`DATA_DIR`,
//! `INGEST_MAX_BYTES`, ...), so a deployment configured only through the
//! environment needs no config file.

use std::path::PathBuf;

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Default base data directory (`DATA_DIR`, else `./data`)
pub fn default_data_dir() -> PathBuf {
    std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Default maximum document size (20 MiB)
pub fn default_max_bytes() -> u64 {
    env_parse("INGEST_MAX_BYTES", 20 * 1024 * 1024)
}

/// Default allowed content types
pub fn default_allowed_content_types() -> Vec<String> {
    let raw = std::env::var("INGEST_ALLOWED_TYPES")
        .unwrap_or_else(|_| "text/html,application/pdf".to_string());
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Default idempotency window (10 minutes)
pub fn default_idempotency_ttl() -> u64 {
    env_parse("INGEST_IDEMPOTENCY_TTL_SECONDS", 600)
}

/// Default user agent
pub fn default_user_agent() -> String {
    std::env::var("USER_AGENT")
        .unwrap_or_else(|_| "earnings-agent (+contact@example.com)".to_string())
}

/// Default connect timeout in seconds
pub fn default_connect_timeout() -> f64 {
    env_parse("INGEST_CONNECT_TIMEOUT", 5.0)
}

/// Default read timeout in seconds
pub fn default_read_timeout() -> f64 {
    env_parse("INGEST_READ_TIMEOUT", 25.0)
}

/// Default write timeout in seconds
pub fn default_write_timeout() -> f64 {
    env_parse("INGEST_WRITE_TIMEOUT", 10.0)
}

/// Default pool acquisition timeout in seconds
pub fn default_pool_timeout() -> f64 {
    env_parse("INGEST_POOL_TIMEOUT", 5.0)
}

/// Default total attempts per fetch
pub fn default_retry_max_attempts() -> u32 {
    3
}

/// Default backoff unit (1 second)
pub fn default_backoff_base_ms() -> u64 {
    1000
}

/// Default lower bound on a single backoff wait
pub fn default_backoff_min_ms() -> u64 {
    1000
}

/// Default upper bound on a single backoff wait
pub fn default_backoff_max_ms() -> u64 {
    8000
}
