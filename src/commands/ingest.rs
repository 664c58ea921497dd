//! Ingest command implementation

use crate::config::Config;
use crate::error::Result;
use crate::ingest::{FetchOutcome, Fetcher};
use crate::ticker::{validate_source_url, Ticker};
use tracing::info;

/// Fetch one document for a ticker into the archive
pub async fn cmd_ingest(
    config: &Config,
    ticker: &str,
    url: &str,
    show_progress: bool,
) -> Result<FetchOutcome> {
    let ticker = Ticker::parse(ticker)?;
    validate_source_url(url)?;

    info!(ticker = %ticker, url = %url, "Ingesting document");
    let fetcher = Fetcher::new(config)?.with_progress(show_progress);
    fetcher.fetch_to_disk(&ticker, url).await
}

/// Print ingest result to console
pub fn print_ingest(outcome: &FetchOutcome) {
    let status = if outcome.from_cache {
        "cached"
    } else {
        "downloaded"
    };
    println!("\n📥 Document {}\n", status);
    println!("Path: {}", outcome.path.display());
    println!("Content type: {}", outcome.content_type);
    println!("Bytes: {}", outcome.byte_count);
    if !outcome.from_cache && outcome.attempts > 1 {
        println!("Attempts: {}", outcome.attempts);
    }
}
