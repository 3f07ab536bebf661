//! Prometheus metrics for publishing and consuming events.

use crate::error::{ErrorCategory, MessagingError};
use metrics::{counter, histogram};
use std::time::Duration;

/// Metrics labelled by exchange.
#[derive(Clone, Debug)]
pub struct MessagingMetrics {
    exchange: String,
}

impl MessagingMetrics {
    pub fn new(exchange: &str) -> Self {
        Self {
            exchange: exchange.to_string(),
        }
    }

    pub fn event_published(&self, operation: &str) {
        counter!(
            "messaging_events_published_total",
            "exchange" => self.exchange.clone(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    pub fn publish_failed(&self, operation: &str) {
        counter!(
            "messaging_publish_failures_total",
            "exchange" => self.exchange.clone(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    pub fn message_received(&self) {
        counter!(
            "messaging_messages_received_total",
            "exchange" => self.exchange.clone()
        )
        .increment(1);
    }

    pub fn message_processed(&self, duration: Duration) {
        counter!(
            "messaging_messages_processed_total",
            "exchange" => self.exchange.clone()
        )
        .increment(1);

        histogram!(
            "messaging_message_duration_seconds",
            "exchange" => self.exchange.clone()
        )
        .record(duration.as_secs_f64());
    }

    pub fn message_failed(&self, category: ErrorCategory) {
        counter!(
            "messaging_messages_failed_total",
            "exchange" => self.exchange.clone(),
            "category" => category.to_string()
        )
        .increment(1);
    }
}

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<metrics_exporter_prometheus::PrometheusHandle, MessagingError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MessagingError::Metrics(e.to_string()))
}
