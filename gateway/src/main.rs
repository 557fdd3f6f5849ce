use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};
use verification_gateway::{
    server,
    types::{Environment, ProviderConfig},
    verification_provider::{VerificationProvider, VerificationProviderClient},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development reads credentials from `.env`
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    // JSON lines in production, human-readable output against the sandbox
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    // Missing credentials stop the process here, never per request
    let provider_config = ProviderConfig::from_env()?;
    tracing::info!(
        "Using provider {} with default level {}",
        provider_config.base_url,
        provider_config.default_level_name
    );

    let provider: Arc<dyn VerificationProvider> =
        Arc::new(VerificationProviderClient::new(&provider_config)?);

    server::start(
        environment,
        provider,
        provider_config.access_token_settings(),
    )
    .await
}
