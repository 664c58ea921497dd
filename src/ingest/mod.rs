//! Document ingestion: fetch a URL into the per-ticker archive
//!
//! This module provides:
//! - Save-path derivation (`path`)
//! - Content-type and size enforcement (`policy`)
//! - The TTL-bound idempotency index (`index`)
//! - Retry with exponential backoff (`retry`)
//! - The [`Fetcher`] that ties them together

mod index;
mod path;
mod policy;
mod retry;

pub use index::*;
pub use path::*;
pub use policy::*;
pub use retry::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::progress::add_progress_bar;
use crate::ticker::{validate_source_url, Ticker};
use indicatif::ProgressBar;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Result of a `fetch_to_disk` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOutcome {
    pub path: PathBuf,
    pub content_type: String,
    pub byte_count: u64,
    /// Served from the idempotency index without network I/O
    pub from_cache: bool,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

/// What a HEAD probe learned; both fields are `None` when the probe failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeResult {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

impl ProbeResult {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            content_type: header_string(headers, CONTENT_TYPE.as_str()),
            content_length: header_string(headers, CONTENT_LENGTH.as_str())
                .and_then(|len| len.parse::<u64>().ok()),
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Sibling path a document is streamed into before it is renamed into place
fn part_path(save_path: &Path) -> PathBuf {
    let mut name = save_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    save_path.with_file_name(name)
}

/// Remove a partially written file, ignoring "already gone"
async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), "Failed to remove partial file: {}", e);
        }
    }
}

/// Fetches documents into `{data_dir}/raw/{TICKER}/`
pub struct Fetcher {
    client: Client,
    raw_dir: PathBuf,
    policy: ContentPolicy,
    index: IdempotencyIndex,
    retry: RetryPolicy,
    dispatch_timeout: Duration,
    show_progress: bool,
}

impl Fetcher {
    /// Create a new fetcher
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.ingest.user_agent)
            .connect_timeout(config.timeouts.connect())
            .read_timeout(config.timeouts.read())
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            raw_dir: config.raw_dir(),
            policy: ContentPolicy::from_config(&config.ingest),
            index: IdempotencyIndex::new(
                config.index_file(),
                Duration::from_secs(config.ingest.idempotency_ttl_secs),
            ),
            retry: RetryPolicy::from_config(&config.retry),
            dispatch_timeout: config.timeouts.dispatch(),
            show_progress: false,
        })
    }

    /// Draw a progress bar while streaming (CLI use)
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn index(&self) -> &IdempotencyIndex {
        &self.index
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Fetch `url` for `ticker` into the archive, or return the cached result
    /// of an identical fetch inside the idempotency window.
    ///
    /// Transport failures, timeouts and 5xx answers are retried with backoff;
    /// size and type violations and 4xx answers are returned immediately.
    pub async fn fetch_to_disk(&self, ticker: &Ticker, url: &str) -> Result<FetchOutcome> {
        validate_source_url(url)?;
        self.retry
            .run(|attempt| self.fetch_once(ticker, url, attempt))
            .await
    }

    async fn fetch_once(&self, ticker: &Ticker, url: &str, attempt: u32) -> Result<FetchOutcome> {
        if let Some(record) = self.index.get_recent(ticker, url) {
            info!(ticker = %ticker, url = %url, path = %record.saved_path.display(), "Serving from ingest index");
            return Ok(FetchOutcome {
                path: record.saved_path,
                content_type: record.content_type,
                byte_count: record.byte_count,
                from_cache: true,
                attempts: attempt,
            });
        }

        debug!(ticker = %ticker, url = %url, attempt, "Fetching");

        let probe = self.probe(url).await;
        self.policy
            .check_probed_type(probe.content_type.as_deref())?;
        self.policy.check_declared_size(probe.content_length)?;

        let response = self.dispatch(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type =
            header_string(response.headers(), CONTENT_TYPE.as_str()).or(probe.content_type.clone());
        let save_path = build_save_path(&self.raw_dir, ticker, url, content_type.as_deref())?;
        let part = part_path(&save_path);

        let byte_count = match self.stream_to_file(response, &part).await {
            Ok(n) => n,
            Err(e) => {
                discard(&part).await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .policy
            .check_final_type(probe.content_type.as_deref(), content_type.as_deref())
        {
            discard(&part).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&part, &save_path).await {
            discard(&part).await;
            return Err(e.into());
        }

        let content_type = content_type.unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        let record = IngestRecord::new(
            ticker,
            url,
            save_path.clone(),
            content_type.clone(),
            byte_count,
        );
        // the document is already in place; a lost index entry only costs a refetch
        if let Err(e) = self.index.put(ticker, url, record) {
            warn!(
                ticker = %ticker,
                url = %url,
                index = %self.index.path().display(),
                "Failed to update ingest index: {}",
                e
            );
        }

        info!(
            ticker = %ticker,
            url = %url,
            path = %save_path.display(),
            bytes = byte_count,
            "Saved document"
        );

        Ok(FetchOutcome {
            path: save_path,
            content_type,
            byte_count,
            from_cache: false,
            attempts: attempt,
        })
    }

    /// Best-effort HEAD; any failure leaves type and size unknown
    async fn probe(&self, url: &str) -> ProbeResult {
        match tokio::time::timeout(self.dispatch_timeout, self.client.head(url).send()).await {
            Ok(Ok(response)) if response.status().is_success() => {
                ProbeResult::from_headers(response.headers())
            }
            Ok(Ok(response)) => {
                debug!(url = %url, status = %response.status(), "Probe not answered, continuing with GET");
                ProbeResult::default()
            }
            Ok(Err(e)) => {
                debug!(url = %url, "Probe failed, continuing with GET: {}", e);
                ProbeResult::default()
            }
            Err(_) => {
                debug!(url = %url, "Probe timed out, continuing with GET");
                ProbeResult::default()
            }
        }
    }

    async fn dispatch(&self, url: &str) -> Result<Response> {
        match tokio::time::timeout(self.dispatch_timeout, self.client.get(url).send()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout(format!(
                "no response from {} within {:?}",
                url, self.dispatch_timeout
            ))),
        }
    }

    async fn stream_to_file(&self, mut response: Response, path: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(path).await?;

        let bar = if self.show_progress {
            add_progress_bar(response.content_length().unwrap_or(0))
        } else {
            ProgressBar::hidden()
        };

        let result = self.copy_body(&mut response, &mut file, &bar).await;
        bar.finish_and_clear();
        result
    }

    async fn copy_body(
        &self,
        response: &mut Response,
        file: &mut tokio::fs::File,
        bar: &ProgressBar,
    ) -> Result<u64> {
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            self.policy.check_running_total(written)?;
            file.write_all(&chunk).await?;
            bar.inc(chunk.len() as u64);
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}
