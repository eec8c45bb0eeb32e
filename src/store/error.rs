//! Content store errors.

use thiserror::Error;

/// Failure to obtain content from the wiki.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-retryable HTTP status (4xx other than 429)
    #[error("{url}: HTTP {status}")]
    Http { url: String, status: u16 },

    /// Request could not be sent and the failure is not worth retrying
    #[error("{url}: {message}")]
    Transport { url: String, message: String },

    /// Response arrived but could not be decoded
    #[error("{url}: invalid response: {message}")]
    Decode { url: String, message: String },

    /// Transient failures persisted past the retry budget
    #[error("{url}: giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },

    #[error("invalid request URL `{0}`")]
    InvalidUrl(String),
}
