use thiserror::Error;

/// Errors returned by the grocery-search client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, DNS, TLS, or timeout failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API was reachable but answered with a non-2xx status.
    #[error("upstream returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String },

    /// A 2xx response whose body is not valid JSON.
    #[error("JSON decode error for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Coarse classification of [`FetchError`] used by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Transport,
    Upstream,
    Decode,
    Config,
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Upstream { .. } => FetchErrorKind::Upstream,
            FetchError::Decode { .. } => FetchErrorKind::Decode,
            FetchError::InvalidBaseUrl { .. } => FetchErrorKind::Config,
        }
    }
}
