//! Save-path derivation for archived documents

use super::policy::normalize_content_type;
use crate::error::Result;
use crate::ticker::Ticker;
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use url::Url;

/// Fallback basename for URLs without a final path segment
const DEFAULT_BASENAME: &str = "download";

/// Extension for a content type, `.bin` when it is neither HTML nor PDF
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match normalize_content_type(content_type).as_str() {
        "text/html" => ".html",
        "application/pdf" => ".pdf",
        _ => ".bin",
    }
}

/// Extension guessed from the URL path suffix
pub fn extension_for_url(url: &Url) -> &'static str {
    let path = url.path().to_lowercase();
    if path.ends_with(".pdf") {
        ".pdf"
    } else if path.ends_with(".html") || path.ends_with(".htm") {
        ".html"
    } else {
        ".bin"
    }
}

/// Last non-empty path segment (`/news/q2-results/` -> `q2-results`);
/// only a root path falls back to `download`
fn url_basename(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_BASENAME.to_string())
}

/// Create `{raw_dir}/{TICKER}` if needed and return it
pub fn ensure_ticker_dir(raw_dir: &Path, ticker: &Ticker) -> Result<PathBuf> {
    let dir = raw_dir.join(ticker.as_str());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Build the archive path for a document fetched today (UTC)
pub fn build_save_path(
    raw_dir: &Path,
    ticker: &Ticker,
    url: &str,
    content_type: Option<&str>,
) -> Result<PathBuf> {
    build_save_path_on(raw_dir, ticker, url, content_type, Utc::now().date_naive())
}

/// Build the archive path `{raw_dir}/{TICKER}/{YYYYMMDD}_{basename}{ext}`.
///
/// The extension comes from `content_type` when one is known, otherwise from
/// the URL suffix. It is only appended when the basename does not already end
/// with it.
pub fn build_save_path_on(
    raw_dir: &Path,
    ticker: &Ticker,
    url: &str,
    content_type: Option<&str>,
    date: NaiveDate,
) -> Result<PathBuf> {
    let parsed = Url::parse(url)?;
    let dir = ensure_ticker_dir(raw_dir, ticker)?;

    let ext = match content_type.filter(|ct| !ct.trim().is_empty()) {
        Some(ct) => extension_for_content_type(ct),
        None => extension_for_url(&parsed),
    };

    let mut basename = url_basename(&parsed);
    if !basename.ends_with(ext) {
        basename.push_str(ext);
    }

    Ok(dir.join(format!("{}_{}", date.format("%Y%m%d"), basename)))
}
