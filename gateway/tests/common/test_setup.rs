use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{body::Body, http::Request, response::Response, Extension, Router};
use tower::ServiceExt;
use verification_gateway::{
    routes,
    signature::RequestSigner,
    types::{Environment, ProviderConfig},
    verification_provider::{VerificationProvider, VerificationProviderClient},
};

use super::{RecordedRequest, StubProvider};

pub const TEST_APP_TOKEN: &str = "sbx:test-app-token";
pub const TEST_SECRET_KEY: &str = "test-secret-key";
pub const TEST_LEVEL_NAME: &str = "basic-kyc-level";

/// Setup test environment
pub fn setup_test_env() {
    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Gateway wired to a stub provider through the real HTTP client
pub struct TestSetup {
    pub router: Router,
    pub stub: StubProvider,
    pub config: ProviderConfig,
}

impl TestSetup {
    pub async fn new() -> Self {
        Self::build(Environment::Sandbox, None).await
    }

    pub async fn with_environment(environment: Environment) -> Self {
        Self::build(environment, None).await
    }

    /// Points the gateway at `base_url` instead of the stub
    pub async fn with_provider_url(base_url: &str) -> Self {
        Self::build(Environment::Sandbox, Some(base_url.to_string())).await
    }

    async fn build(environment: Environment, base_url: Option<String>) -> Self {
        setup_test_env();

        let stub = StubProvider::start().await;
        let config = ProviderConfig {
            base_url: base_url.unwrap_or_else(|| stub.base_url.clone()),
            app_token: TEST_APP_TOKEN.to_string(),
            secret_key: TEST_SECRET_KEY.to_string(),
            default_level_name: TEST_LEVEL_NAME.to_string(),
        };

        let provider: Arc<dyn VerificationProvider> = Arc::new(
            VerificationProviderClient::new(&config).expect("Failed to create provider client"),
        );

        let mut openapi = OpenApi::default();
        let router = routes::handler(environment)
            .finish_api(&mut openapi)
            .layer(Extension(openapi))
            .layer(Extension(provider))
            .layer(Extension(config.access_token_settings()));

        Self {
            router,
            stub,
            config,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }

    pub async fn read_response_text(
        &self,
        response: Response,
    ) -> Result<String, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        Ok(String::from_utf8(body.to_vec())?)
    }
}

/// Asserts the request carries the app token and a valid signature over what was received
pub fn assert_signed(request: &RecordedRequest) {
    assert_eq!(request.header("x-app-token"), Some(TEST_APP_TOKEN));

    let timestamp: i64 = request
        .header("x-app-access-ts")
        .expect("missing X-App-Access-Ts")
        .parse()
        .expect("X-App-Access-Ts is not an integer");
    let signature = request
        .header("x-app-access-sig")
        .expect("missing X-App-Access-Sig");

    let expected = RequestSigner::new(TEST_SECRET_KEY).unwrap().sign(
        timestamp,
        &request.method,
        &request.path_and_query,
        request.body.as_bytes(),
    );
    assert_eq!(signature, expected, "signature mismatch for {}", request.path_and_query);
}
