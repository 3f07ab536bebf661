//! Liveness, readiness and metrics endpoints for consumer processes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Health status of the worker.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub broker_connected: bool,
    pub database_connected: bool,
}

/// Shared health state, updated by the worker's monitor task.
#[derive(Clone)]
pub struct HealthState {
    service: String,
    inner: Arc<RwLock<HealthStateInner>>,
}

struct HealthStateInner {
    broker_connected: bool,
    database_connected: bool,
    consumer_running: bool,
    last_error: Option<String>,
}

impl HealthState {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            inner: Arc::new(RwLock::new(HealthStateInner {
                broker_connected: false,
                database_connected: false,
                consumer_running: true,
                last_error: None,
            })),
        }
    }

    pub async fn set_broker_connected(&self, connected: bool) {
        self.inner.write().await.broker_connected = connected;
    }

    pub async fn set_database_connected(&self, connected: bool) {
        self.inner.write().await.database_connected = connected;
    }

    /// Marks the consumer loop as dead; liveness fails from then on.
    pub async fn set_consumer_stopped(&self, reason: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.consumer_running = false;
        inner.last_error = Some(reason.into());
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.inner.write().await.last_error = error;
    }

    /// Liveness only tracks the consumer loop. A broker blip should not
    /// restart the process.
    pub async fn is_alive(&self) -> bool {
        self.inner.read().await.consumer_running
    }

    /// Readiness needs both dependencies.
    pub async fn is_ready(&self) -> bool {
        let inner = self.inner.read().await;
        inner.consumer_running && inner.broker_connected && inner.database_connected
    }

    pub async fn status(&self) -> HealthStatus {
        let inner = self.inner.read().await;
        let ready = inner.consumer_running && inner.broker_connected && inner.database_connected;
        let status = if ready {
            "ok".to_string()
        } else {
            format!(
                "unhealthy: {}",
                inner.last_error.as_deref().unwrap_or("dependencies not ready")
            )
        };

        HealthStatus {
            status,
            service: self.service.clone(),
            broker_connected: inner.broker_connected,
            database_connected: inner.database_connected,
        }
    }
}

/// Health server for orchestrator probes.
pub struct HealthServer {
    port: u16,
    state: HealthState,
    metrics_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
}

impl HealthServer {
    pub fn new(port: u16, state: HealthState) -> Self {
        Self {
            port,
            state,
            metrics_handle: None,
        }
    }

    /// Set the metrics handle for /metrics endpoint.
    pub fn with_metrics(mut self, handle: metrics_exporter_prometheus::PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    pub fn state(&self) -> HealthState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .with_state(self.state.clone());

        if let Some(handle) = self.metrics_handle.clone() {
            router = router.route(
                "/metrics",
                get(move || {
                    let handle = handle.clone();
                    async move { handle.render() }
                }),
            );
        }

        router
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let addr = format!("0.0.0.0:{}", self.port);

        info!(addr = %addr, "Starting health server");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let status = state.status().await;
    if state.is_alive().await {
        (StatusCode::OK, Json(status))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(status))
    }
}

async fn ready_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let status = state.status().await;
    if state.is_ready().await {
        (StatusCode::OK, Json(status))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_status(router: Router, path: &str) -> StatusCode {
        router
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_ready_requires_dependencies() {
        let state = HealthState::new("users");
        let server = HealthServer::new(0, state.clone());

        assert_eq!(get_status(server.router(), "/health").await, StatusCode::OK);
        assert_eq!(
            get_status(server.router(), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        state.set_broker_connected(true).await;
        state.set_database_connected(true).await;
        assert_eq!(get_status(server.router(), "/ready").await, StatusCode::OK);
        assert_eq!(state.status().await.status, "ok");
    }

    #[tokio::test]
    async fn test_stopped_consumer_fails_liveness() {
        let state = HealthState::new("users");
        state.set_consumer_stopped("subscription closed").await;

        let server = HealthServer::new(0, state.clone());
        assert_eq!(
            get_status(server.router(), "/health").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert!(state.status().await.status.contains("subscription closed"));
    }
}
