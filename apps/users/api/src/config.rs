use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_or_default, error_tracking::ErrorTrackingConfig,
    server::ServerConfig,
};
use database::common::RetryConfig;
use database::sql::DatabaseConfig;
use messaging::BrokerConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Users API configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
    /// Events are published only when `NATS_URL` is set
    pub broker: BrokerConfig,
    /// API_PREFIX: mount point of the users routes
    pub api_prefix: String,
    pub error_tracking: ErrorTrackingConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app: app_info!("users").with_env_overrides(),
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            retry: RetryConfig::from_env()?,
            broker: BrokerConfig::from_env()?,
            api_prefix: env_or_default("API_PREFIX", DEFAULT_API_PREFIX),
            error_tracking: ErrorTrackingConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
