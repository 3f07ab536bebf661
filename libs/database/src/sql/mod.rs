//! SQL database connector and utilities
//!
//! Connection management, migration running and health probes for any
//! backend SeaORM supports here (SQLite and PostgreSQL).

mod config;
mod connector;
mod health;

pub use config::{DEFAULT_DATABASE_URL, DatabaseConfig};
pub use connector::{
    connect, connect_from_config, connect_from_config_with_retry, connect_with_options,
    run_migrations,
};
pub use health::{HealthStatus, check_health, check_health_detailed, check_health_with_query};

pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
