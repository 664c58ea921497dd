//! Custom error types for earnings-agent

use serde::Serialize;
use thiserror::Error;

/// Main error type for earnings-agent operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document too large: {0}")]
    TooLarge(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Missing required fields: {0}")]
    ExtractionMissing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias for earnings-agent
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for callers that map failures onto
/// their own outward representation (exit codes, HTTP statuses, JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TooLarge,
    UnsupportedType,
    TransientNetwork,
    UpstreamClientError,
    UpstreamServerError,
    ExtractionMissing,
    NotFound,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    /// HTTP status a serving layer would answer with
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::TooLarge => 413,
            ErrorKind::UnsupportedType => 415,
            ErrorKind::InvalidInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::ExtractionMissing => 422,
            ErrorKind::UpstreamClientError | ErrorKind::UpstreamServerError => 502,
            ErrorKind::TransientNetwork => 504,
            ErrorKind::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::TooLarge => "too_large",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::TransientNetwork => "transient_network",
            ErrorKind::UpstreamClientError => "upstream_client_error",
            ErrorKind::UpstreamServerError => "upstream_server_error",
            ErrorKind::ExtractionMissing => "extraction_missing",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", name)
    }
}

/// Serializable summary of an error, as printed by the CLI with `--json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
}

impl Error {
    pub fn report(&self) -> ErrorReport {
        let kind = self.kind();
        ErrorReport {
            kind,
            status: kind.http_status(),
            message: self.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TooLarge(_) => ErrorKind::TooLarge,
            Error::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Error::UpstreamStatus { status, .. } if *status >= 500 => {
                ErrorKind::UpstreamServerError
            }
            Error::UpstreamStatus { .. } => ErrorKind::UpstreamClientError,
            Error::Timeout(_) | Error::Http(_) => ErrorKind::TransientNetwork,
            Error::ExtractionMissing(_) => ErrorKind::ExtractionMissing,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidTicker(_) | Error::InvalidUrl(_) | Error::UrlParse(_) => {
                ErrorKind::InvalidInput
            }
            Error::Config(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_) => ErrorKind::Internal,
        }
    }

    /// Whether the fetch retry loop may try again after this error.
    ///
    /// Connect, send and body failures, phase timeouts and 5xx answers are
    /// transient. Redirect-limit and request-builder errors are final, as are
    /// size and type violations.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => match e.status() {
                Some(status) => status.is_server_error(),
                None => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            },
            Error::Timeout(_) => true,
            Error::UpstreamStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        let server = Error::UpstreamStatus {
            status: 502,
            url: "https://example.com".to_string(),
        };
        let client = Error::UpstreamStatus {
            status: 404,
            url: "https://example.com".to_string(),
        };

        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(Error::Timeout("connect".to_string()).is_retryable());
        assert!(!Error::TooLarge("big".to_string()).is_retryable());
        assert!(!Error::UnsupportedType("image/png".to_string()).is_retryable());
    }

    #[test]
    fn test_builder_error_is_final() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert!(err.is_builder());
        assert!(!Error::Http(err).is_retryable());
    }

    #[test]
    fn test_kind_mapping() {
        let err = Error::UpstreamStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UpstreamServerError);
        assert_eq!(err.kind().http_status(), 502);

        assert_eq!(Error::TooLarge(String::new()).kind().http_status(), 413);
        assert_eq!(
            Error::ExtractionMissing(String::new()).kind(),
            ErrorKind::ExtractionMissing
        );
        assert_eq!(ErrorKind::TransientNetwork.to_string(), "transient_network");
    }

    #[test]
    fn test_report_json() {
        let report = Error::UnsupportedType("image/png".to_string()).report();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kind"], "unsupported_type");
        assert_eq!(value["status"], 415);
        assert_eq!(value["message"], "Unsupported content type: image/png");
    }
}
