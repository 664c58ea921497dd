//! Content-type allowlist and size ceiling

use crate::config::IngestConfig;
use crate::error::{Error, Result};

/// Generic label used when the origin never reported a content type
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Strip MIME parameters, trim and lower-case (`Text/HTML; charset=utf-8` -> `text/html`)
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// What a document may be: which types and how many bytes
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    allowed: Vec<String>,
    max_bytes: u64,
}

impl ContentPolicy {
    pub fn new(allowed: &[String], max_bytes: u64) -> Self {
        Self {
            allowed: allowed
                .iter()
                .map(|t| normalize_content_type(t))
                .filter(|t| !t.is_empty())
                .collect(),
            max_bytes,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(&config.allowed_content_types, config.max_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Exact match of the normalized type against the normalized allowlist
    pub fn is_allowed(&self, content_type: &str) -> bool {
        let normalized = normalize_content_type(content_type);
        self.allowed.iter().any(|t| *t == normalized)
    }

    /// Checkpoint before transfer: reject a probed type outside the allowlist
    pub fn check_probed_type(&self, content_type: Option<&str>) -> Result<()> {
        match content_type {
            Some(ct) if !self.is_allowed(ct) => Err(Error::UnsupportedType(ct.to_string())),
            _ => Ok(()),
        }
    }

    /// Checkpoint after transfer: the authoritative type is rejected only when
    /// it differs from what the probe reported and is not allowed
    pub fn check_final_type(&self, probed: Option<&str>, final_type: Option<&str>) -> Result<()> {
        let Some(ct) = final_type else {
            return Ok(());
        };

        let changed = probed.map(normalize_content_type) != Some(normalize_content_type(ct));
        if changed && !self.is_allowed(ct) {
            return Err(Error::UnsupportedType(ct.to_string()));
        }
        Ok(())
    }

    /// Reject a declared length above the ceiling before any data is requested
    pub fn check_declared_size(&self, declared: Option<u64>) -> Result<()> {
        match declared {
            Some(len) if len > self.max_bytes => Err(Error::TooLarge(format!(
                "Content-Length {} exceeds limit {}",
                len, self.max_bytes
            ))),
            _ => Ok(()),
        }
    }

    /// Check a running byte count during the transfer
    pub fn check_running_total(&self, written: u64) -> Result<()> {
        if written > self.max_bytes {
            return Err(Error::TooLarge(format!(
                "Downloaded more than {} bytes",
                self.max_bytes
            )));
        }
        Ok(())
    }
}
