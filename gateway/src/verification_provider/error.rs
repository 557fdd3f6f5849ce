use thiserror::Error;

use crate::signature::SignerError;

/// Errors returned by the verification provider client
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// The configured base URL cannot be parsed or cannot carry a path
    #[error("Invalid provider base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request signer could not be built
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The request could not be serialized
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    /// The request never produced a response (connection, timeout, middleware)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The response body could not be read
    #[error("Network error: {0}")]
    Body(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code returned by the provider
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The provider answered with a body that does not match the call contract
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}
