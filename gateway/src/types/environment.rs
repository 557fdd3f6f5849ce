//! Environment configuration for the provider deployments

use std::env;
use std::fmt;

/// Application environment configuration
///
/// The label mirrors the provider account the gateway is pointed at. It never
/// changes how requests to the provider are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Provider production account
    Production,
    /// Provider sandbox account
    Sandbox,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "sandbox".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "sandbox" => Self::Sandbox,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Sandbox)
    }

    /// Whether logs should be emitted as JSON lines
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Sandbox => write!(f, "sandbox"),
        }
    }
}
