mod config;
mod environment;
mod error;
mod extractors;

pub use config::{AccessTokenSettings, ConfigError, ProviderConfig};
pub use environment::Environment;
pub use error::{AppError, ErrorResponse};
pub use extractors::ValidatedJson;
