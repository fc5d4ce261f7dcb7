//! Provider error types.

use thiserror::Error;

/// Errors that can arise when calling an OpenAI-compatible API.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// HTTP transport failure, including client-side timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response did not match the expected wire format.
    #[error("{0}")]
    Api(String),
}
