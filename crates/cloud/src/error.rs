/// Errors from external service clients.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// Object storage request failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but the body was not what we expect.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}
