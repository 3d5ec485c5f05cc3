//! Error types shared across the retrieval and estimation pipeline

use thiserror::Error;

/// Errors from an upstream data source (Gamma or CLOB)
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Malformed(e.to_string())
    }
}

/// Errors surfaced to the caller of a search
///
/// An empty result set is `Ok(vec![])`, never an error; callers can rely on
/// the distinction between "nothing matched" and "upstream was unreachable"
/// for user messaging.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network/timeout/non-2xx before any market data was obtained
    #[error("market source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered but the body could not be interpreted
    #[error("malformed market data: {0}")]
    MalformedResponse(String),

    /// The search was superseded before completion
    #[error("search cancelled")]
    Cancelled,
}

impl From<SourceError> for SearchError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Malformed(msg) => SearchError::MalformedResponse(msg),
            other => SearchError::UpstreamUnavailable(other.to_string()),
        }
    }
}
