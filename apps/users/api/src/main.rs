use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::WrapErr;
use messaging::{MessageBroker, NatsBroker};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use users_api::config::Config;
use users_api::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&config.environment);
    config.error_tracking.log_startup(&config.app);

    info!(
        service = %config.app.name,
        database = %config.database.redacted_url(),
        "Starting users API"
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

    let mut state = AppState::new(config.clone(), db);

    // The API keeps serving without a broker; events are simply not published.
    if let Some(url) = &config.broker.url {
        match NatsBroker::connect_with_name(url, &config.app.name).await {
            Ok(broker) => {
                info!(url = %url, exchange = %config.broker.exchange, "Publishing user events");
                state = state.with_broker(Arc::new(broker));
            }
            Err(e) => warn!(error = %e, "Broker unavailable, user events disabled"),
        }
    } else {
        info!("NATS_URL not set, user events disabled");
    }

    let app = users_api::build_app(&state)?;

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: flushing broker and closing database");

        if let Some(broker) = &state.broker {
            if let Err(e) = broker.close().await {
                tracing::error!("Error flushing broker: {}", e);
            }
        }

        match state.db.close().await {
            Ok(_) => info!("Database connection closed successfully"),
            Err(e) => tracing::error!("Error closing database: {}", e),
        }
    })
    .await
    .wrap_err("Server error")?;

    info!("Users API shutdown complete");
    Ok(())
}
