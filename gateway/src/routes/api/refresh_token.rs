use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    types::{AccessTokenSettings, AppError, ValidatedJson},
    verification_provider::{ApplicantIdentifiers, SdkAccessTokenRequest, VerificationProvider},
};

#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// User id the expiring token was issued for
    #[serde(default, deserialize_with = "super::null_as_empty")]
    #[schemars(with = "String")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    /// New SDK access token, valid for 20 minutes
    pub token: String,
    pub user_id: String,
}

/// Mints a fresh SDK access token for an existing applicant
///
/// Always uses the configured default level. No applicant is created.
///
/// # Errors
///
/// - 400 if `userId` is missing or empty
/// - 500 if the provider call fails
#[instrument(skip_all)]
pub async fn handler(
    Extension(provider): Extension<Arc<dyn VerificationProvider>>,
    Extension(settings): Extension<AccessTokenSettings>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, AppError> {
    let access_token = provider
        .create_sdk_access_token(&SdkAccessTokenRequest {
            user_id: payload.user_id.clone(),
            level_name: settings.default_level_name,
            ttl_in_secs: settings.ttl_secs,
            // Required by the provider on refresh, even when empty
            applicant_identifiers: Some(ApplicantIdentifiers::default()),
        })
        .await
        .map_err(|e| AppError::upstream("Failed to refresh access token", &e))?;

    tracing::info!("Refreshed access token for {}", payload.user_id);

    Ok(Json(RefreshTokenResponse {
        token: access_token.token,
        user_id: payload.user_id,
    }))
}
