//! Headline extraction from archived press releases
//!
//! Picks the newest HTML document for a ticker, strips it to plain text and
//! pulls out total revenue and diluted EPS.

mod html;

pub use html::*;

use crate::error::{Error, Result};
use crate::ticker::Ticker;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// The two figures taken from one document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    /// Total revenue in currency units (already scaled)
    pub revenue: f64,
    pub eps_diluted: f64,
}

/// Extraction result for one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySnapshot {
    pub ticker: Ticker,
    pub headline: Headline,
    pub source_path: PathBuf,
}

fn revenue_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Revenue.*?\$?(\d[\d,]*(?:\.\d+)?)\s*(billion|million)?")
            .expect("revenue pattern is valid")
    })
}

fn eps_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Diluted EPS.*?\$?(\d[\d,]*(?:\.\d+)?)(?:[,\s]|$)")
            .expect("EPS pattern is valid")
    })
}

/// Parse a number that may contain thousands separators
fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

fn scale_for(unit: Option<&str>) -> f64 {
    match unit.map(|u| u.to_ascii_lowercase()).as_deref() {
        Some("billion") => 1e9,
        Some("million") => 1e6,
        _ => 1.0,
    }
}

/// Newest `*.html` document under `{raw_dir}/{TICKER}`, by file name.
///
/// Archive names start with `YYYYMMDD_`, so the greatest name is the most
/// recent fetch.
pub fn latest_file(raw_dir: &Path, ticker: &Ticker) -> Result<PathBuf> {
    let dir = raw_dir.join(ticker.as_str());
    if !dir.is_dir() {
        return Err(Error::NotFound(format!("No raw files for {}", ticker)));
    }

    let latest = std::fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "html"))
        .max_by(|a, b| a.file_name().cmp(&b.file_name()));

    latest.ok_or_else(|| Error::NotFound(format!("No HTML files for {}", ticker)))
}

/// Read a document as text; invalid UTF-8 is replaced rather than rejected
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.display(), "Document is not valid UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Find revenue and diluted EPS in a plain-text rendering of a document
pub fn parse_headline_text(text: &str) -> Result<Headline> {
    let revenue = revenue_regex().captures(text).and_then(|caps| {
        let value = parse_number(caps.get(1)?.as_str())?;
        Some(value * scale_for(caps.get(2).map(|m| m.as_str())))
    });
    let eps_diluted = eps_regex()
        .captures(text)
        .and_then(|caps| parse_number(caps.get(1)?.as_str()));

    match (revenue, eps_diluted) {
        (Some(revenue), Some(eps_diluted)) => Ok(Headline {
            revenue,
            eps_diluted,
        }),
        _ => Err(Error::ExtractionMissing("Missing revenue or EPS".to_string())),
    }
}

/// Strip markup from `html` and extract the headline
pub fn parse_headline(html: &str) -> Result<Headline> {
    parse_headline_text(&html_to_text(html))
}

/// Headline of the newest archived HTML document for `ticker`
pub fn extract_snapshot(raw_dir: &Path, ticker: &Ticker) -> Result<CompanySnapshot> {
    let source_path = latest_file(raw_dir, ticker)?;
    debug!(ticker = %ticker, path = %source_path.display(), "Extracting headline");

    let html = read_document(&source_path)?;
    let headline = parse_headline(&html)?;

    Ok(CompanySnapshot {
        ticker: ticker.clone(),
        headline,
        source_path,
    })
}
