//! Users Sync Worker
//!
//! Consumes user lifecycle events from the broker and applies them to the
//! local users table. Probes and Prometheus metrics are served on
//! `HEALTH_PORT`.

mod config;

use crate::config::Config;
use axum_helpers::server::shutdown_signal;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::retry_with_backoff;
use domain_users::{SqlUserRepository, UserEventHandler};
use eyre::WrapErr;
use messaging::{Consumer, HealthServer, HealthState, MessageBroker, NatsBroker, init_metrics};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

const MONITOR_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&config.environment);
    config.error_tracking.log_startup(&config.app);

    info!(service = %config.app.name, "Starting users sync worker");

    let metrics = init_metrics().wrap_err("Failed to install metrics recorder")?;
    let health = HealthState::new(config.app.name.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut health_shutdown = shutdown_rx.clone();
    let health_task = tokio::spawn(
        HealthServer::new(config.health_port, health.clone())
            .with_metrics(metrics)
            .run(async move {
                while health_shutdown.changed().await.is_ok() {
                    if *health_shutdown.borrow() {
                        break;
                    }
                }
            }),
    );

    let db = database::sql::connect_from_config_with_retry(
        config.database.clone(),
        Some(config.retry.clone()),
    )
    .await
    .wrap_err("Database connection failed")?;

    database::sql::run_migrations::<migration::Migrator>(&db, &config.app.name)
        .await
        .wrap_err("Database migrations failed")?;
    health.set_database_connected(true).await;

    let url = config.broker.url_or_default();
    let broker: Arc<dyn MessageBroker> = Arc::new(
        retry_with_backoff(
            || NatsBroker::connect_with_name(url, &config.app.name),
            config.retry.clone(),
        )
        .await?,
    );
    health.set_broker_connected(true).await;
    info!(url = %url, "Connected to broker");

    let monitor_task = tokio::spawn(monitor(
        db.clone(),
        broker.clone(),
        health.clone(),
        shutdown_rx.clone(),
    ));

    let handler = UserEventHandler::new(SqlUserRepository::new(db.clone()));
    let consumer = Consumer::new(broker.clone(), handler, config.consumer());
    let consumer_rx = shutdown_rx.clone();
    let mut consumer_task = tokio::spawn(async move { consumer.run(consumer_rx).await });

    let early_exit = tokio::select! {
        _ = shutdown_signal() => None,
        joined = &mut consumer_task => Some(joined),
    };

    let _ = shutdown_tx.send(true);
    let joined = match early_exit {
        Some(joined) => joined,
        None => consumer_task.await,
    };

    let outcome = match joined {
        Ok(Ok(())) => {
            info!("Consumer drained");
            Ok(())
        }
        Ok(Err(e)) => {
            health.set_consumer_stopped(e.to_string()).await;
            error!(error = %e, "Consumer stopped");
            Err(eyre::Report::new(e).wrap_err("Consumer stopped"))
        }
        Err(e) => {
            error!(error = %e, "Consumer task panicked");
            Err(eyre::eyre!("Consumer task panicked: {}", e))
        }
    };

    if let Err(e) = monitor_task.await {
        warn!(error = %e, "Monitor task ended abnormally");
    }
    if let Err(e) = broker.close().await {
        error!("Error flushing broker: {}", e);
    }
    match db.close().await {
        Ok(_) => info!("Database connection closed successfully"),
        Err(e) => error!("Error closing database: {}", e),
    }
    match health_task.await {
        Ok(Err(e)) => warn!(error = %e, "Health server failed"),
        Err(e) => warn!(error = %e, "Health server task panicked"),
        Ok(Ok(())) => {}
    }

    info!("Users sync worker shutdown complete");
    outcome
}

/// Keeps the probe state in line with the broker and database connections.
async fn monitor(
    db: DatabaseConnection,
    broker: Arc<dyn MessageBroker>,
    health: HealthState,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(MONITOR_INTERVAL);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        let broker_ok = broker.is_connected();
        let db_result = database::sql::check_health(&db).await;

        health.set_broker_connected(broker_ok).await;
        health.set_database_connected(db_result.is_ok()).await;

        match (&db_result, broker_ok) {
            (Ok(()), true) => health.set_error(None).await,
            (Err(e), _) => {
                warn!(error = %e, "Database check failed");
                health.set_error(Some(e.to_string())).await;
            }
            (Ok(()), false) => {
                warn!("Broker connection lost");
                health.set_error(Some("broker disconnected".to_string())).await;
            }
        }
    }
}
