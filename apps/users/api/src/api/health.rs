use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

use crate::state::AppState;

/// Readiness: the database must answer, the broker is reported but optional.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::sql::check_health(&state.db)
                .await
                .map_err(|e| format!("Database ping failed: {}", e))
        }),
    )];

    let broker = match &state.broker {
        Some(broker) if broker.is_connected() => "connected",
        Some(_) => "disconnected",
        None => "disabled",
    };

    let (status, axum::Json(mut body)) = match run_health_checks(checks).await {
        Ok(result) | Err(result) => result,
    };
    if let Some(map) = body.as_object_mut() {
        map.insert("broker".to_string(), broker.into());
    }

    (status, axum::Json(body)).into_response()
}
