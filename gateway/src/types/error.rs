//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::verification_provider::ProviderError;

/// Error body the verification widget expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Underlying failure, present for upstream errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            inner: ErrorResponse {
                error: error.into(),
                details: None,
            },
        }
    }

    /// Attach the underlying failure to the response body
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.inner.details = Some(details.into());
        self
    }

    /// Invalid input from the caller, no upstream call was made
    #[must_use]
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// A provider call failed; the provider's error text is passed through
    #[must_use]
    pub fn upstream(error: &'static str, source: &ProviderError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error).with_details(source.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {}", self.inner.error),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error,
                self.inner.details.as_deref().unwrap_or_default()
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl OperationOutput for AppError {
    type Inner = ErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ErrorResponse>::operation_response(ctx, operation)
    }
}
