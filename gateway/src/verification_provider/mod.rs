//! Client for the verification provider REST API.
//!
//! All calls go through a single signed send path so that the signed path and
//! body are byte-for-byte what goes on the wire.

mod error;
mod types;

use std::time::Duration;

use chrono::Utc;
use reqwest::{header, Client, Method};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use url::{Position, Url};

pub use error::ProviderError;
pub use types::{
    Applicant, ApplicantIdentifiers, CreateApplicantRequest, SdkAccessToken,
    SdkAccessTokenRequest,
};

use crate::{signature::RequestSigner, types::ProviderConfig};

/// Header carrying the app-level credential
pub const APP_TOKEN_HEADER: &str = "X-App-Token";
/// Header carrying the signing timestamp in unix seconds
pub const ACCESS_TS_HEADER: &str = "X-App-Access-Ts";
/// Header carrying the request signature
pub const ACCESS_SIG_HEADER: &str = "X-App-Access-Sig";

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Trait for the verification provider API
#[async_trait::async_trait]
pub trait VerificationProvider: Send + Sync {
    /// Creates an applicant for `external_user_id` under `level_name`
    async fn create_applicant(
        &self,
        external_user_id: &str,
        level_name: &str,
    ) -> Result<Applicant, ProviderError>;

    /// Mints an access token for the client-side SDK
    async fn create_sdk_access_token(
        &self,
        request: &SdkAccessTokenRequest,
    ) -> Result<SdkAccessToken, ProviderError>;

    /// Fetches the full applicant record as the provider's exact JSON text
    async fn get_applicant(&self, applicant_id: &str) -> Result<Box<RawValue>, ProviderError>;
}

/// HTTP client to the verification provider, signing every request
pub struct VerificationProviderClient {
    base_url: Url,
    app_token: String,
    signer: RequestSigner,
    http_client: ClientWithMiddleware,
}

impl VerificationProviderClient {
    /// Creates a new provider client
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is empty, the base URL cannot be
    /// parsed, or the HTTP client fails to be created
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let signer = RequestSigner::new(&config.secret_key)?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidBaseUrl(config.base_url.clone()));
        }

        let reqwest_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .user_agent(format!(
                "verification-gateway/{}",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            base_url,
            app_token: config.app_token.clone(),
            signer,
            http_client,
        })
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Signs and sends one request, decoding a successful JSON response
    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
    ) -> Result<T, ProviderError> {
        let body = body.unwrap_or_default();
        let timestamp = Utc::now().timestamp();
        let signature = self.signer.sign(
            timestamp,
            &method,
            &url[Position::BeforePath..],
            body.as_bytes(),
        );

        tracing::debug!("{method} {}", url.path());

        let mut request = self
            .http_client
            .request(method, url)
            .header(header::ACCEPT, "application/json")
            .header(APP_TOKEN_HEADER, self.app_token.as_str())
            .header(ACCESS_TS_HEADER, timestamp.to_string())
            .header(ACCESS_SIG_HEADER, signature);

        if !body.is_empty() {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn to_json_body<T: serde::Serialize>(value: &T) -> Result<Option<String>, ProviderError> {
    serde_json::to_string(value)
        .map(Some)
        .map_err(|e| ProviderError::Serialization(e.to_string()))
}

#[async_trait::async_trait]
impl VerificationProvider for VerificationProviderClient {
    async fn create_applicant(
        &self,
        external_user_id: &str,
        level_name: &str,
    ) -> Result<Applicant, ProviderError> {
        let mut url = self.endpoint(&["resources", "applicants"]);
        url.query_pairs_mut().append_pair("levelName", level_name);

        let body = to_json_body(&CreateApplicantRequest { external_user_id })?;

        self.send_signed(Method::POST, url, body).await
    }

    async fn create_sdk_access_token(
        &self,
        request: &SdkAccessTokenRequest,
    ) -> Result<SdkAccessToken, ProviderError> {
        let url = self.endpoint(&["resources", "accessTokens", "sdk"]);
        let body = to_json_body(request)?;

        self.send_signed(Method::POST, url, body).await
    }

    async fn get_applicant(&self, applicant_id: &str) -> Result<Box<RawValue>, ProviderError> {
        let url = self.endpoint(&["resources", "applicants", applicant_id, "one"]);

        self.send_signed(Method::GET, url, None).await
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::sync::Mutex;

    use serde_json::value::RawValue;

    use super::{
        Applicant, ProviderError, SdkAccessToken, SdkAccessTokenRequest, VerificationProvider,
    };

    /// A call received by the mock, in arrival order
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProviderCall {
        CreateApplicant {
            external_user_id: String,
            level_name: String,
        },
        CreateSdkAccessToken(SdkAccessTokenRequest),
        GetApplicant(String),
    }

    /// In-memory provider that records every call
    #[derive(Default)]
    pub struct MockVerificationProvider {
        calls: Mutex<Vec<ProviderCall>>,
        fail_create_applicant: bool,
        fail_access_token: bool,
        applicant: Option<Box<RawValue>>,
    }

    impl MockVerificationProvider {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes `create_applicant` fail with a provider error
        #[must_use]
        pub fn failing_create_applicant(mut self) -> Self {
            self.fail_create_applicant = true;
            self
        }

        /// Makes `create_sdk_access_token` fail with a provider error
        #[must_use]
        pub fn failing_access_token(mut self) -> Self {
            self.fail_access_token = true;
            self
        }

        /// Record returned by `get_applicant`; without one the lookup fails with 404
        ///
        /// # Panics
        ///
        /// Panics if `applicant` is not valid JSON
        #[must_use]
        pub fn with_applicant(mut self, applicant: &str) -> Self {
            let record = RawValue::from_string(applicant.to_string())
                .expect("applicant record must be valid JSON");
            self.applicant = Some(record);
            self
        }

        /// Calls received so far
        ///
        /// # Panics
        ///
        /// Panics if the call log mutex is poisoned
        #[must_use]
        pub fn calls(&self) -> Vec<ProviderCall> {
            self.calls.lock().expect("call log poisoned").clone()
        }

        fn record(&self, call: ProviderCall) {
            self.calls.lock().expect("call log poisoned").push(call);
        }

        fn failure(status: u16, body: &str) -> ProviderError {
            ProviderError::UnexpectedStatus {
                status,
                body: body.to_string(),
            }
        }
    }

    #[async_trait::async_trait]
    impl VerificationProvider for MockVerificationProvider {
        async fn create_applicant(
            &self,
            external_user_id: &str,
            level_name: &str,
        ) -> Result<Applicant, ProviderError> {
            self.record(ProviderCall::CreateApplicant {
                external_user_id: external_user_id.to_string(),
                level_name: level_name.to_string(),
            });

            if self.fail_create_applicant {
                return Err(Self::failure(409, "Applicant already exists"));
            }

            Ok(Applicant {
                id: format!("applicant-{external_user_id}"),
                external_user_id: Some(external_user_id.to_string()),
            })
        }

        async fn create_sdk_access_token(
            &self,
            request: &SdkAccessTokenRequest,
        ) -> Result<SdkAccessToken, ProviderError> {
            self.record(ProviderCall::CreateSdkAccessToken(request.clone()));

            if self.fail_access_token {
                return Err(Self::failure(500, "Token service unavailable"));
            }

            Ok(SdkAccessToken {
                token: format!("token-{}", request.user_id),
                user_id: Some(request.user_id.clone()),
            })
        }

        async fn get_applicant(&self, applicant_id: &str) -> Result<Box<RawValue>, ProviderError> {
            self.record(ProviderCall::GetApplicant(applicant_id.to_string()));

            self.applicant
                .clone()
                .ok_or_else(|| Self::failure(404, "Applicant not found"))
        }
    }
}
