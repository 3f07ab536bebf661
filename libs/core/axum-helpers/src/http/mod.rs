//! HTTP middleware module.
//!
//! - CORS configuration from `CORS_ALLOWED_ORIGIN`
//! - Request-path stamping of error bodies
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{attach_request_url, cors_layer_from_env};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(attach_request_url))
//!     .layer(cors_layer_from_env(&environment)?);
//! ```

pub mod cors;
pub mod request_url;

pub use cors::{cors_layer_from_env, create_cors_layer, create_permissive_cors_layer};
pub use request_url::attach_request_url;
