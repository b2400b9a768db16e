use thiserror::Error;
use url::Url;

/// Reasons a page could not be fetched.
///
/// Every variant is recovered the same way by the navigator: the
/// enhancement steps aside and the host performs a full navigation.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error fetching {url}: {message}")]
    Transport { url: Url, message: String },

    #[error("{url} answered with status {status}")]
    Status { url: Url, status: u16 },

    #[error("timed out fetching {url}")]
    Timeout { url: Url },

    #[error("fetcher unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while building a navigator from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),
}
