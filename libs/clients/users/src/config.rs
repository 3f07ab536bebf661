use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default};
use std::time::Duration;

pub const DEFAULT_USERS_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Where the users API lives and how long to wait for it.
///
/// - USERS_SERVICE_URL: defaults to http://localhost:8000
/// - API_PREFIX: defaults to /api/v1
/// - USERS_CLIENT_TIMEOUT_SECS: defaults to 10
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL of `path` under the API prefix
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');

        if prefix.is_empty() {
            format!("{}/{}", base, path)
        } else {
            format!("{}/{}/{}", base, prefix, path)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_USERS_SERVICE_URL)
    }
}

impl FromEnv for ClientConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = env_parse_or_default("USERS_CLIENT_TIMEOUT_SECS", "10")?;

        Ok(Self {
            base_url: env_or_default("USERS_SERVICE_URL", DEFAULT_USERS_SERVICE_URL),
            api_prefix: env_or_default("API_PREFIX", DEFAULT_API_PREFIX),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
