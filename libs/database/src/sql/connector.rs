use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::DatabaseConfig;
use crate::common::{RetryConfig, retry, retry_with_backoff};

/// Connect with the default pool settings for `database_url`
///
/// # Example
/// ```ignore
/// let db = database::sql::connect("sqlite://./users.db?mode=rwc").await?;
/// ```
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect_from_config(DatabaseConfig::new(database_url)).await
}

/// Connect using a [`DatabaseConfig`]
pub async fn connect_from_config(config: DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let target = config.redacted_url();
    let db = Database::connect(config.into_connect_options()).await?;
    info!(database = %target, backend = ?db.get_database_backend(), "Connected to database");
    Ok(db)
}

/// Connect with custom connection options
pub async fn connect_with_options(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    info!(backend = ?db.get_database_backend(), "Connected to database with custom options");
    Ok(db)
}

/// Connect from config with exponential backoff on failure
///
/// # Example
/// ```ignore
/// use database::common::RetryConfig;
/// use database::sql::{DatabaseConfig, connect_from_config_with_retry};
///
/// let config = DatabaseConfig::from_env()?;
/// let db = connect_from_config_with_retry(config, Some(RetryConfig::from_env()?)).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: DatabaseConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    match retry_config {
        Some(policy) => retry_with_backoff(|| connect_from_config(config.clone()), policy).await,
        None => retry(|| connect_from_config(config.clone())).await,
    }
}

/// Apply all pending migrations of `M`
///
/// # Example
/// ```ignore
/// database::sql::run_migrations::<migration::Migrator>(&db, "users_api").await?;
/// ```
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DbErr> {
    info!("Running {} database migrations...", app_name);
    M::up(db, None).await?;
    info!("Migrations completed successfully for {}", app_name);
    Ok(())
}
