use std::sync::Arc;

use aide::{
    generate::GenContext,
    openapi::{Operation, Response as OpenApiResponse},
    OperationOutput,
};
use axum::{
    extract::Path,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::instrument;

use crate::{types::AppError, verification_provider::VerificationProvider};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantPath {
    /// Applicant id returned by `/api/access-token`
    pub applicant_id: String,
}

/// Applicant record with the provider's exact JSON text
///
/// The body is never decoded, so numbers beyond `f64` precision and key order
/// reach the caller unchanged.
#[derive(Debug)]
pub struct ApplicantRecord(Box<RawValue>);

impl IntoResponse for ApplicantRecord {
    fn into_response(self) -> Response {
        let body: Box<str> = self.0.into();
        ([(header::CONTENT_TYPE, "application/json")], String::from(body)).into_response()
    }
}

impl OperationOutput for ApplicantRecord {
    type Inner = serde_json::Value;

    fn operation_response(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        Json::<serde_json::Value>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        Json::<serde_json::Value>::inferred_responses(ctx, operation)
    }
}

/// Relays the provider's applicant record as-is
///
/// # Errors
///
/// - 500 if the provider call fails
#[instrument(skip(provider))]
pub async fn handler(
    Extension(provider): Extension<Arc<dyn VerificationProvider>>,
    Path(path): Path<ApplicantPath>,
) -> Result<ApplicantRecord, AppError> {
    let applicant = provider
        .get_applicant(&path.applicant_id)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch applicant status", &e))?;

    Ok(ApplicantRecord(applicant))
}
