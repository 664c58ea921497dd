//! Idempotency index: the last successful fetch per (ticker, URL)
//!
//! The whole index is one pretty-printed JSON object keyed by `TICKER|url`.
//! Every read and write loads the full file; writes go to a sibling temp file
//! that is renamed over the target, so readers only ever see a complete index.
//!
//! There is no locking. Two processes updating different keys at the same
//! time can lose one of the updates, which only costs a cache miss later.

use crate::error::Result;
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// A cached fetch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRecord {
    pub ticker: String,
    pub url: String,
    pub saved_path: PathBuf,
    pub content_type: String,
    pub byte_count: u64,
    /// RFC 3339, UTC
    pub saved_at: String,
}

impl IngestRecord {
    pub fn new(
        ticker: &Ticker,
        url: &str,
        saved_path: PathBuf,
        content_type: String,
        byte_count: u64,
    ) -> Self {
        Self {
            ticker: ticker.to_string(),
            url: url.to_string(),
            saved_path,
            content_type,
            byte_count,
            saved_at: Utc::now().to_rfc3339(),
        }
    }

    fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.saved_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Composite key; the URL is used verbatim
pub fn index_key(ticker: &Ticker, url: &str) -> String {
    format!("{}|{}", ticker, url)
}

/// File-backed idempotency index
#[derive(Debug, Clone)]
pub struct IdempotencyIndex {
    path: PathBuf,
    ttl: Duration,
}

impl IdempotencyIndex {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load the full index; a missing or unreadable file is an empty index
    pub fn load(&self) -> BTreeMap<String, IngestRecord> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read ingest index, treating as empty: {}", e);
                return BTreeMap::new();
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return BTreeMap::new();
        }

        match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "Corrupt ingest index, treating as empty: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Fresh record for (ticker, url), if one exists and its file is still on disk
    pub fn get_recent(&self, ticker: &Ticker, url: &str) -> Option<IngestRecord> {
        let key = index_key(ticker, url);
        let record = self.load().remove(&key)?;

        let Some(saved_at) = record.saved_at() else {
            debug!(key = %key, saved_at = %record.saved_at, "Unparsable timestamp in index entry");
            return None;
        };

        // a timestamp in the future (clock stepped back) counts as expired
        let elapsed = Utc::now().signed_duration_since(saved_at).to_std();
        if !elapsed.map_or(false, |age| age <= self.ttl) {
            debug!(key = %key, "Index entry expired");
            return None;
        }

        if !record.saved_path.exists() {
            debug!(key = %key, path = %record.saved_path.display(), "Indexed file is gone");
            return None;
        }

        Some(record)
    }

    /// Insert or replace the record for (ticker, url) and persist atomically
    pub fn put(&self, ticker: &Ticker, url: &str, record: IngestRecord) -> Result<()> {
        let mut entries = self.load();
        entries.insert(index_key(ticker, url), record);
        self.store(&entries)
    }

    fn store(&self, entries: &BTreeMap<String, IngestRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        let bytes = serde_json::to_vec_pretty(entries)?;
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }

        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
