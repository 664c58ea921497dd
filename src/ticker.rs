//! Ticker symbols and source URL validation

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Maximum ticker length
pub const MAX_TICKER_LEN: usize = 8;

/// A validated, upper-cased ticker symbol (`A-Z`, `0-9`, `.`, `-`; 1 to 8 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Normalize to upper case and validate
    pub fn parse(raw: &str) -> Result<Self> {
        let symbol = raw.trim().to_uppercase();

        if symbol.is_empty() || symbol.len() > MAX_TICKER_LEN {
            return Err(Error::InvalidTicker(format!(
                "'{}' must be 1-{} characters",
                raw, MAX_TICKER_LEN
            )));
        }

        if !symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '.')
        {
            return Err(Error::InvalidTicker(format!(
                "'{}' may only contain A-Z, 0-9, '-' and '.'",
                raw
            )));
        }

        // "." and ".." pass the character check but would escape the archive
        if !symbol.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidTicker(format!(
                "'{}' must contain a letter or digit",
                raw
            )));
        }

        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Ticker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check that `raw` is an absolute http(s) URL with a host
pub fn validate_source_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::InvalidUrl(format!(
            "{}: only http and https are supported",
            raw
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidUrl(format!("{}: URL has no host", raw)));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalizes_case() {
        assert_eq!(Ticker::parse("msft").unwrap().as_str(), "MSFT");
        assert_eq!(Ticker::parse("BRK.B").unwrap().as_str(), "BRK.B");
        assert_eq!(Ticker::parse("RDS-A").unwrap().to_string(), "RDS-A");
    }

    #[test]
    fn test_ticker_rejects_bad_input() {
        assert!(Ticker::parse("").is_err());
        assert!(Ticker::parse("TOOLONGTK").is_err());
        assert!(Ticker::parse("MS FT").is_err());
        assert!(Ticker::parse("../etc").is_err());
        assert!(Ticker::parse("..").is_err());
        assert!(matches!(
            Ticker::parse("A$"),
            Err(Error::InvalidTicker(_))
        ));
    }

    #[test]
    fn test_ticker_serde_validates() {
        let ticker: Ticker = serde_json::from_str("\"aapl\"").unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
        assert!(serde_json::from_str::<Ticker>("\"not valid\"").is_err());
    }

    #[test]
    fn test_validate_source_url() {
        assert!(validate_source_url("https://example.com/press.html").is_ok());
        assert!(validate_source_url("http://example.com").is_ok());
        assert!(validate_source_url("ftp://example.com/file.pdf").is_err());
        assert!(validate_source_url("/relative/path").is_err());
        assert!(validate_source_url("file:///etc/passwd").is_err());
    }
}
