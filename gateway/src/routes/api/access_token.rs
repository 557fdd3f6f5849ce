use std::sync::Arc;

use axum::{Extension, Json};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    types::{AccessTokenSettings, AppError, ValidatedJson},
    verification_provider::{SdkAccessTokenRequest, VerificationProvider},
};

/// Length of the random part of a session user id
const SESSION_SUFFIX_LEN: usize = 6;

#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenRequest {
    /// Caller's user identifier
    #[serde(default, deserialize_with = "super::null_as_empty")]
    #[schemars(with = "String")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    /// Verification level; the configured default is used when omitted
    #[serde(default)]
    pub level_name: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    /// SDK access token, valid for 20 minutes
    pub token: String,
    /// Applicant created for this session
    pub applicant_id: String,
    /// Session user id the applicant and token were issued for
    pub user_id: String,
}

/// Issues an SDK access token for a new verification session
///
/// 1. Derives a session user id unique to this request
/// 2. Creates an applicant for it under the selected level
/// 3. Mints an SDK access token for the same id and level
///
/// The token is only requested once the applicant exists.
///
/// # Errors
///
/// - 400 if `userId` is missing or empty
/// - 500 if either provider call fails
#[instrument(skip_all)]
pub async fn handler(
    Extension(provider): Extension<Arc<dyn VerificationProvider>>,
    Extension(settings): Extension<AccessTokenSettings>,
    ValidatedJson(payload): ValidatedJson<AccessTokenRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let level_name = payload
        .level_name
        .filter(|level| !level.is_empty())
        .unwrap_or(settings.default_level_name);
    let session_user_id = session_user_id(&payload.user_id);

    let applicant = provider
        .create_applicant(&session_user_id, &level_name)
        .await
        .map_err(|e| AppError::upstream("Failed to generate access token", &e))?;

    tracing::info!(
        "Created applicant {} for {session_user_id} at level {level_name}",
        applicant.id
    );

    let access_token = provider
        .create_sdk_access_token(&SdkAccessTokenRequest {
            user_id: session_user_id.clone(),
            level_name,
            ttl_in_secs: settings.ttl_secs,
            applicant_identifiers: None,
        })
        .await
        .map_err(|e| AppError::upstream("Failed to generate access token", &e))?;

    tracing::info!("Issued access token for {session_user_id}");

    Ok(Json(AccessTokenResponse {
        token: access_token.token,
        applicant_id: applicant.id,
        user_id: session_user_id,
    }))
}

/// `{user_id}_{unix_millis}_{random}` so repeated sessions for one user never collide
fn session_user_id(user_id: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("{user_id}_{}_{suffix}", Utc::now().timestamp_millis())
}
