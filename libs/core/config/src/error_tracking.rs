use crate::{env_optional, AppInfo, ConfigError, FromEnv};
use tracing::info;

/// External error-tracking settings.
///
/// - SENTRY_DSN: empty or unset disables reporting
/// - SENTRY_RELEASE: release tag, defaults to the service version
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorTrackingConfig {
    pub dsn: Option<String>,
    pub release: Option<String>,
}

impl ErrorTrackingConfig {
    pub fn is_enabled(&self) -> bool {
        self.dsn.is_some()
    }

    /// Release tag, falling back to the service version.
    pub fn release_or<'a>(&'a self, app: &'a AppInfo) -> &'a str {
        self.release.as_deref().unwrap_or(&app.version)
    }

    /// Logs the error-tracking setup for this process.
    pub fn log_startup(&self, app: &AppInfo) {
        if self.is_enabled() {
            info!(
                service = %app.name,
                release = self.release_or(app),
                "Error tracking configured"
            );
        } else {
            info!(service = %app.name, "Error tracking disabled (SENTRY_DSN not set)");
        }
    }
}

impl FromEnv for ErrorTrackingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: env_optional("SENTRY_DSN"),
            release: env_optional("SENTRY_RELEASE"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tracking_disabled_when_dsn_blank() {
        temp_env::with_vars([("SENTRY_DSN", Some("")), ("SENTRY_RELEASE", None)], || {
            let config = ErrorTrackingConfig::from_env().unwrap();
            assert!(!config.is_enabled());
            assert_eq!(config, ErrorTrackingConfig::default());
        });
    }

    #[test]
    fn test_error_tracking_release_defaults_to_version() {
        temp_env::with_vars(
            [
                ("SENTRY_DSN", Some("https://key@errors.example.com/1")),
                ("SENTRY_RELEASE", None),
            ],
            || {
                let config = ErrorTrackingConfig::from_env().unwrap();
                let app = AppInfo::new("users", "1.2.3");
                assert!(config.is_enabled());
                assert_eq!(config.release_or(&app), "1.2.3");
            },
        );
    }

    #[test]
    fn test_error_tracking_explicit_release() {
        temp_env::with_var("SENTRY_RELEASE", Some("users@2024.11"), || {
            let config = ErrorTrackingConfig::from_env().unwrap();
            let app = AppInfo::new("users", "1.2.3");
            assert_eq!(config.release_or(&app), "users@2024.11");
        });
    }
}
