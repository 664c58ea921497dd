//! earnings-agent - fetch and read quarterly earnings releases
//!
//! This crate provides:
//! - A fetch engine that archives press releases per ticker, with size and
//!   type limits, retry with backoff and a TTL-bound idempotency index
//! - Headline extraction (revenue, diluted EPS) from archived HTML
//! - Period-over-period deltas against stored baselines
//! - The CLI commands built on top of them

pub mod commands;
pub mod config;
pub mod delta;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod progress;
pub mod ticker;

pub use config::Config;
pub use error::{Error, Result};
