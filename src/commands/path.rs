//! Save-path preview

use crate::config::Config;
use crate::error::Result;
use crate::ingest::build_save_path;
use crate::ticker::{validate_source_url, Ticker};
use std::path::PathBuf;

/// Where `ingest` would store `url` for `ticker` today. Creates the ticker
/// directory as a side effect, like a real fetch would.
pub fn cmd_path(
    config: &Config,
    ticker: &str,
    url: &str,
    content_type: Option<&str>,
) -> Result<PathBuf> {
    let ticker = Ticker::parse(ticker)?;
    validate_source_url(url)?;
    build_save_path(&config.raw_dir(), &ticker, url, content_type)
}
