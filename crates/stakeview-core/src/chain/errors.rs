use thiserror::Error;

/// Errors that can occur when talking to the chain gateway or the account API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChainError {
    /// Request exceeded the configured timeout duration.
    #[error("Request timeout")]
    Timeout,

    /// Failed to establish a connection or build the HTTP client.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error occurred (non-2xx status code).
    ///
    /// First field is the HTTP status code, second is the error message.
    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    /// Network-level error from the underlying HTTP client.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The VM rejected the query (return code other than `ok`).
    #[error("Query {endpoint} failed with {code}: {message}")]
    QueryFailed { endpoint: String, code: String, message: String },

    /// Response could not be parsed or was malformed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A return slot was present but did not match the expected shape.
    #[error("Failed to decode result of {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// The query succeeded but returned no value where one was required.
    #[error("No value returned by {0}")]
    MissingValue(String),

    /// A query argument could not be encoded.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Maximum concurrent requests limit has been reached.
    #[error("Concurrency limit reached: {0}")]
    ConcurrencyLimit(String),
}

impl ChainError {
    pub(crate) fn decode(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::Decode { endpoint: endpoint.to_string(), reason: reason.into() }
    }

    /// Returns `true` if this error is transient and the request may succeed if retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::ConnectionFailed(_) | Self::ConcurrencyLimit(_) => true,
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::HttpError(status, _) => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
