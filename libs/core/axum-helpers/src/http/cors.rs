use axum::http::{HeaderValue, Method, header};
use core_config::Environment;
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Creates a CORS layer for the given list of origins.
///
/// - Common HTTP methods (GET, POST, PATCH, DELETE, OPTIONS)
/// - Content-Type and Accept headers
/// - 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Creates a permissive CORS layer for development.
///
/// Allows any origin - **DO NOT USE IN PRODUCTION**.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN` (comma-separated).
///
/// When the variable is unset, development gets a permissive layer and
/// production allows no cross-origin requests.
pub fn cors_layer_from_env(environment: &Environment) -> io::Result<CorsLayer> {
    let Some(origins) = core_config::env_optional("CORS_ALLOWED_ORIGIN") else {
        if environment.is_development() {
            info!("CORS_ALLOWED_ORIGIN not set, using permissive CORS for development");
            return Ok(create_permissive_cors_layer());
        }
        warn!("CORS_ALLOWED_ORIGIN not set, cross-origin requests are rejected");
        return Ok(CorsLayer::new());
    };

    let allowed_origins = parse_origins(&origins)?;
    info!("CORS configured with allowed origins: {}", origins);

    Ok(create_cors_layer(allowed_origins))
}

fn parse_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(origins)
}
