//! Provider credentials and token settings, read once at startup

use std::env;
use std::fmt;

use thiserror::Error;

/// Provider API used when `PROVIDER_BASE_URL` is not set
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.sumsub.com";

/// Level used when `PROVIDER_LEVEL_NAME` is not set
pub const DEFAULT_LEVEL_NAME: &str = "basic-kyc-level";

/// Lifetime requested for every SDK access token (20 minutes)
pub const ACCESS_TOKEN_TTL_SECS: u64 = 1200;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent or blank
    #[error("{0} environment variable is not set")]
    MissingVariable(&'static str),

    /// A variable is present but cannot be used
    #[error("{name} environment variable is invalid: {reason}")]
    InvalidVariable {
        /// Variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Credentials and defaults for talking to the verification provider
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the provider API, without a trailing slash
    pub base_url: String,
    /// App-level credential sent as `X-App-Token`
    pub app_token: String,
    /// Shared secret used to sign requests
    pub secret_key: String,
    /// Level used when the caller does not pick one
    pub default_level_name: String,
}

impl ProviderConfig {
    /// Reads the provider configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `PROVIDER_APP_TOKEN` or `PROVIDER_SECRET_KEY` is missing,
    /// or if `PROVIDER_BASE_URL` is not an http(s) URL
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_token = required_var("PROVIDER_APP_TOKEN")?;
        let secret_key = required_var("PROVIDER_SECRET_KEY")?;

        let default_level_name = optional_var("PROVIDER_LEVEL_NAME")
            .unwrap_or_else(|| DEFAULT_LEVEL_NAME.to_string());

        let base_url = optional_var("PROVIDER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

        Ok(Self {
            base_url,
            app_token,
            secret_key,
            default_level_name,
        })
    }

    /// Token settings handed to the HTTP handlers
    #[must_use]
    pub fn access_token_settings(&self) -> AccessTokenSettings {
        AccessTokenSettings {
            default_level_name: self.default_level_name.clone(),
            ttl_secs: ACCESS_TOKEN_TTL_SECS,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("app_token", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("default_level_name", &self.default_level_name)
            .finish()
    }
}

/// Level and lifetime applied to SDK access tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenSettings {
    /// Level used when the caller does not pick one, and always on refresh
    pub default_level_name: String,
    /// Token lifetime requested from the provider
    pub ttl_secs: u64,
}

fn optional_var(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name).ok_or(ConfigError::MissingVariable(name))
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidVariable {
        name: "PROVIDER_BASE_URL",
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidVariable {
            name: "PROVIDER_BASE_URL",
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}
