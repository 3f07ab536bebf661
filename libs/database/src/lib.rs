//! Relational database access for the users services.
//!
//! Connections go through SeaORM, so the same code runs against PostgreSQL
//! in deployment and SQLite for local runs and tests; the backend is picked
//! from the `DATABASE_URL` scheme.
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::sql::{self, DatabaseConfig};
//! use migration::Migrator;
//!
//! let config = DatabaseConfig::from_env()?;
//! let db = sql::connect_from_config_with_retry(config, None).await?;
//! sql::run_migrations::<Migrator>(&db, "users_api").await?;
//! ```

pub mod common;
pub mod sql;

pub use common::{DatabaseError, DatabaseResult};
