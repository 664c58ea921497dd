//! Period-over-period percentage changes against stored baselines

use crate::error::Result;
use crate::extract::Headline;
use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Comparison period of a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineKind {
    /// Quarter over quarter
    Qoq,
    /// Year over year
    Yoy,
}

impl BaselineKind {
    pub fn file_name(self) -> &'static str {
        match self {
            BaselineKind::Qoq => "qoq_baseline.json",
            BaselineKind::Yoy => "yoy_baseline.json",
        }
    }
}

/// A previously captured headline; either metric may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineHeadline {
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub eps_diluted: Option<f64>,
}

impl From<Headline> for BaselineHeadline {
    fn from(headline: Headline) -> Self {
        Self {
            revenue: Some(headline.revenue),
            eps_diluted: Some(headline.eps_diluted),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BaselineFile {
    headline: BaselineHeadline,
}

/// Percentage changes; `None` where a baseline figure is missing or zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeltaResult {
    pub revenue_yoy_pct: Option<f64>,
    pub revenue_qoq_pct: Option<f64>,
    pub eps_yoy_pct: Option<f64>,
    pub eps_qoq_pct: Option<f64>,
}

/// Relative change in percent, rounded to two decimals
pub fn pct_change(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    let (current, prior) = (current?, prior?);
    if prior == 0.0 {
        return None;
    }
    let pct = (current - prior) / prior * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

pub fn compute_deltas(
    current: &Headline,
    yoy: Option<&BaselineHeadline>,
    qoq: Option<&BaselineHeadline>,
) -> DeltaResult {
    let revenue = Some(current.revenue);
    let eps = Some(current.eps_diluted);

    DeltaResult {
        revenue_yoy_pct: pct_change(revenue, yoy.and_then(|b| b.revenue)),
        revenue_qoq_pct: pct_change(revenue, qoq.and_then(|b| b.revenue)),
        eps_yoy_pct: pct_change(eps, yoy.and_then(|b| b.eps_diluted)),
        eps_qoq_pct: pct_change(eps, qoq.and_then(|b| b.eps_diluted)),
    }
}

/// `{parsed_dir}/{TICKER}/{kind}_baseline.json`
pub fn baseline_path(parsed_dir: &Path, ticker: &Ticker, kind: BaselineKind) -> PathBuf {
    parsed_dir.join(ticker.as_str()).join(kind.file_name())
}

/// Load a stored baseline; a missing file is `None`, a malformed one an error
pub fn load_baseline(
    parsed_dir: &Path,
    ticker: &Ticker,
    kind: BaselineKind,
) -> Result<Option<BaselineHeadline>> {
    let path = baseline_path(parsed_dir, ticker, kind);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(ticker = %ticker, path = %path.display(), "No baseline");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let file: BaselineFile = serde_json::from_str(&content)?;
    Ok(Some(file.headline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn current() -> Headline {
        Headline {
            revenue: 62.0e9,
            eps_diluted: 2.94,
        }
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(Some(62.0e9), Some(54.0e9)), Some(14.81));
        assert_eq!(pct_change(Some(2.94), Some(2.40)), Some(22.5));
        assert_eq!(pct_change(Some(90.0), Some(100.0)), Some(-10.0));
        assert_eq!(pct_change(Some(100.0), Some(100.0)), Some(0.0));
    }

    #[test]
    fn test_pct_change_missing_or_zero_prior() {
        assert_eq!(pct_change(Some(1.0), Some(0.0)), None);
        assert_eq!(pct_change(Some(1.0), None), None);
        assert_eq!(pct_change(None, Some(1.0)), None);
        assert_eq!(pct_change(None, None), None);
    }

    #[test]
    fn test_compute_deltas() {
        let yoy = BaselineHeadline {
            revenue: Some(54.0e9),
            eps_diluted: Some(2.40),
        };
        let qoq = BaselineHeadline {
            revenue: Some(65.6e9),
            eps_diluted: None,
        };

        let deltas = compute_deltas(&current(), Some(&yoy), Some(&qoq));
        assert_eq!(deltas.revenue_yoy_pct, Some(14.81));
        assert_eq!(deltas.eps_yoy_pct, Some(22.5));
        assert_eq!(deltas.revenue_qoq_pct, Some(-5.49));
        assert_eq!(deltas.eps_qoq_pct, None);

        assert_eq!(compute_deltas(&current(), None, None), DeltaResult::default());
    }

    #[test]
    fn test_load_baseline() {
        let tmp = TempDir::new().unwrap();
        let ticker = Ticker::parse("msft").unwrap();
        let dir = tmp.path().join("MSFT");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("yoy_baseline.json"),
            r#"{"headline": {"revenue": 54000000000.0, "eps_diluted": 2.4}, "period": "Q2 FY24"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("qoq_baseline.json"),
            r#"{"headline": {"revenue": null}}"#,
        )
        .unwrap();

        let yoy = load_baseline(tmp.path(), &ticker, BaselineKind::Yoy)
            .unwrap()
            .unwrap();
        assert_eq!(yoy.revenue, Some(54.0e9));
        assert_eq!(yoy.eps_diluted, Some(2.4));

        let qoq = load_baseline(tmp.path(), &ticker, BaselineKind::Qoq)
            .unwrap()
            .unwrap();
        assert_eq!(qoq, BaselineHeadline::default());
    }

    #[test]
    fn test_missing_baseline_is_none_and_malformed_is_error() {
        let tmp = TempDir::new().unwrap();
        let ticker = Ticker::parse("AAPL").unwrap();
        assert_eq!(
            load_baseline(tmp.path(), &ticker, BaselineKind::Qoq).unwrap(),
            None
        );

        let path = baseline_path(tmp.path(), &ticker, BaselineKind::Qoq);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"revenue\": 1}").unwrap();
        assert!(matches!(
            load_baseline(tmp.path(), &ticker, BaselineKind::Qoq),
            Err(Error::Json(_))
        ));
    }
}
