//! Custom extractors for Axum handlers.
//!
//! These reduce boilerplate and route every rejection through [`AppError`]
//! so clients always receive the standard error body.
//!
//! [`AppError`]: crate::errors::AppError

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
