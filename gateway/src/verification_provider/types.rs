use serde::{Deserialize, Serialize};

/// Body of `POST /resources/applicants`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicantRequest<'a> {
    pub external_user_id: &'a str,
}

/// The parts of an applicant record the gateway reads
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    /// Provider-assigned applicant id
    pub id: String,
    /// Identifier the applicant was created for
    #[serde(default)]
    pub external_user_id: Option<String>,
}

/// Auxiliary identifiers attached to an SDK token request.
///
/// Serializes to `{}` when empty; the provider requires the field on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicantIdentifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of `POST /resources/accessTokens/sdk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkAccessTokenRequest {
    pub user_id: String,
    pub level_name: String,
    pub ttl_in_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_identifiers: Option<ApplicantIdentifiers>,
}

/// The parts of an SDK token response the gateway reads
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkAccessToken {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}
