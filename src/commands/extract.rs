//! Extract command implementation

use crate::config::Config;
use crate::delta::{compute_deltas, load_baseline, BaselineKind, DeltaResult};
use crate::error::Result;
use crate::extract::{extract_snapshot, CompanySnapshot};
use crate::ticker::Ticker;
use serde::Serialize;
use tracing::info;

/// Headline of the newest document plus its deltas against stored baselines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotReport {
    pub snapshot: CompanySnapshot,
    pub deltas: DeltaResult,
}

pub fn cmd_extract(config: &Config, ticker: &str) -> Result<SnapshotReport> {
    let ticker = Ticker::parse(ticker)?;
    let snapshot = extract_snapshot(&config.raw_dir(), &ticker)?;

    let parsed_dir = config.parsed_dir();
    let yoy = load_baseline(&parsed_dir, &ticker, BaselineKind::Yoy)?;
    let qoq = load_baseline(&parsed_dir, &ticker, BaselineKind::Qoq)?;
    let deltas = compute_deltas(&snapshot.headline, yoy.as_ref(), qoq.as_ref());

    info!(
        ticker = %ticker,
        revenue = snapshot.headline.revenue,
        eps_diluted = snapshot.headline.eps_diluted,
        "Extracted headline"
    );

    Ok(SnapshotReport { snapshot, deltas })
}

fn format_amount(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${:.2}", value)
    }
}

fn format_pct(pct: Option<f64>) -> String {
    pct.map_or_else(|| "n/a".to_string(), |p| format!("{:+.2}%", p))
}

/// Print snapshot report to console
pub fn print_snapshot_report(report: &SnapshotReport) {
    let SnapshotReport { snapshot, deltas } = report;

    println!("\n📈 {} headline\n", snapshot.ticker);
    println!("Source: {}", snapshot.source_path.display());
    println!(
        "Revenue: {}  (YoY {}, QoQ {})",
        format_amount(snapshot.headline.revenue),
        format_pct(deltas.revenue_yoy_pct),
        format_pct(deltas.revenue_qoq_pct)
    );
    println!(
        "Diluted EPS: ${:.2}  (YoY {}, QoQ {})",
        snapshot.headline.eps_diluted,
        format_pct(deltas.eps_yoy_pct),
        format_pct(deltas.eps_qoq_pct)
    );
}
