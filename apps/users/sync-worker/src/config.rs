//! Configuration for the users sync worker

use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_optional, env_parse_or_default,
    error_tracking::ErrorTrackingConfig,
};
use database::common::RetryConfig;
use database::sql::DatabaseConfig;
use messaging::{BrokerConfig, ConsumerConfig};

pub use core_config::Environment;

pub const DEFAULT_ROUTING_KEY: &str = "user.*";

/// - EVENTS_ROUTING_KEY: binding under the exchange, `user.*` by default;
///   empty binds everything
/// - EVENTS_PREFETCH: messages in flight, defaults to 32
/// - HEALTH_PORT: probe and metrics port, defaults to 8081
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
    pub broker: BrokerConfig,
    pub routing_key: Option<String>,
    pub prefetch: usize,
    pub health_port: u16,
    pub error_tracking: ErrorTrackingConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let routing_key = match std::env::var("EVENTS_ROUTING_KEY") {
            Err(_) => Some(DEFAULT_ROUTING_KEY.to_string()),
            Ok(_) => env_optional("EVENTS_ROUTING_KEY"),
        };

        Ok(Self {
            app: app_info!("users").with_env_overrides(),
            database: DatabaseConfig::from_env()?,
            retry: RetryConfig::from_env()?,
            broker: BrokerConfig::from_env()?,
            routing_key,
            prefetch: env_parse_or_default("EVENTS_PREFETCH", "32")?,
            health_port: env_parse_or_default("HEALTH_PORT", "8081")?,
            error_tracking: ErrorTrackingConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }

    pub fn consumer(&self) -> ConsumerConfig {
        ConsumerConfig {
            service_name: self.app.name.clone(),
            exchange: self.broker.exchange.clone(),
            routing_key: self.routing_key.clone(),
            prefetch: self.prefetch,
        }
    }
}
