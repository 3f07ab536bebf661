use core_config::{env_optional, env_or_default, ConfigError, FromEnv};

pub const DEFAULT_EXCHANGE: &str = "user.events";
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Broker connection settings.
///
/// - NATS_URL: unset leaves the broker unconfigured
/// - EVENTS_EXCHANGE: subject prefix, defaults to `user.events`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
    pub url: Option<String>,
    pub exchange: String,
}

impl BrokerConfig {
    /// Configured URL, or the local default for processes that always need a broker.
    pub fn url_or_default(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_NATS_URL)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: None,
            exchange: DEFAULT_EXCHANGE.to_string(),
        }
    }
}

impl FromEnv for BrokerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_optional("NATS_URL"),
            exchange: env_or_default("EVENTS_EXCHANGE", DEFAULT_EXCHANGE),
        })
    }
}
