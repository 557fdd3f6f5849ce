pub mod access_token;
pub mod applicant;
pub mod refresh_token;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use serde::{Deserialize, Deserializer};

/// Creates the router for the widget-facing API
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/api/access-token", post(access_token::handler))
        .api_route("/api/refresh-token", post(refresh_token::handler))
        .api_route("/api/applicant/{applicantId}", get(applicant::handler))
}

/// Reads an absent or `null` string as empty so validation reports it
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}
