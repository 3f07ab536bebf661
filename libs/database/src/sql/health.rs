use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use std::time::Instant;
use tracing::debug;

use crate::common::DatabaseError;

/// Run `SELECT 1` against the connection's backend
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    check_health_with_query(db, "SELECT 1").await
}

/// Run a caller-supplied probe query
pub async fn check_health_with_query(
    db: &DatabaseConnection,
    query: &str,
) -> Result<(), DatabaseError> {
    debug!(query, "Running database health check");

    let stmt = Statement::from_string(db.get_database_backend(), query.to_owned());
    db.query_one_raw(stmt).await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("query '{}' failed: {}", query, e))
    })?;

    Ok(())
}

/// Health check result with timing
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message),
            response_time_ms,
        }
    }
}

pub async fn check_health_detailed(db: &DatabaseConnection) -> HealthStatus {
    let start = Instant::now();
    let result = check_health(db).await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HealthStatus::healthy(elapsed),
        Err(e) => HealthStatus::unhealthy(e.to_string(), elapsed),
    }
}
