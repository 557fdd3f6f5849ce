use std::sync::Arc;
use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{http::StatusCode, Extension};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::routes;
use crate::types::{AccessTokenSettings, Environment};
use crate::verification_provider::VerificationProvider;

/// Port used when `PORT` is not set
const DEFAULT_PORT: u16 = 3000;

/// Upper bound for one inbound request; covers two sequential provider calls
const REQUEST_TIMEOUT_SECS: u64 = 65;

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if `PORT` is invalid or the server fails to bind to the port
pub async fn start(
    environment: Environment,
    provider: Arc<dyn VerificationProvider>,
    access_token_settings: AccessTokenSettings,
) -> anyhow::Result<()> {
    let mut openapi = OpenApi::default();

    let router = routes::handler(environment)
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(provider))
        .layer(Extension(access_token_settings))
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(request_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)));

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Verification Gateway ({environment}) started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Answers `408 Request Timeout` once a request outlives `timeout`
fn request_timeout(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
