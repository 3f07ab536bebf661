//! Best-effort event publisher.

use crate::broker::MessageBroker;
use crate::envelope::{EventEnvelope, Operation};
use crate::error::MessagingError;
use crate::telemetry::MessagingMetrics;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Publishes lifecycle events to `{exchange}.{topic}`.
///
/// Built once by the process entry point around an owned broker connection
/// and cloned into whatever needs it.
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<dyn MessageBroker>,
    exchange: String,
    source: String,
    metrics: MessagingMetrics,
}

impl EventPublisher {
    pub fn new(
        broker: Arc<dyn MessageBroker>,
        exchange: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let exchange = exchange.into();
        Self {
            broker,
            metrics: MessagingMetrics::new(&exchange),
            exchange,
            source: source.into(),
        }
    }

    /// Full subject for a routing key.
    pub fn subject(&self, topic: &str) -> String {
        format!("{}.{}", self.exchange, topic)
    }

    /// Publish and report the outcome.
    pub async fn try_publish<T>(
        &self,
        topic: &str,
        operation: Operation,
        payload: &T,
    ) -> Result<(), MessagingError>
    where
        T: Serialize + Send + Sync,
    {
        let envelope = EventEnvelope::new(operation, self.source.as_str(), payload);
        let body = serde_json::to_vec(&envelope)?;
        let subject = self.subject(topic);

        self.broker.publish_raw(&subject, &body).await?;
        debug!(event_id = %envelope.id, subject = %subject, "Published event");
        Ok(())
    }

    /// Publish without surfacing failures.
    ///
    /// Errors are logged and counted; the caller's already-committed work
    /// stands either way.
    #[instrument(skip(self, payload), fields(exchange = %self.exchange, operation = %operation))]
    pub async fn publish<T>(&self, topic: &str, operation: Operation, payload: &T)
    where
        T: Serialize + Send + Sync,
    {
        match self.try_publish(topic, operation, payload).await {
            Ok(()) => self.metrics.event_published(operation.as_ref()),
            Err(e) => {
                self.metrics.publish_failed(operation.as_ref());
                error!(error = %e, topic = %topic, "Failed to publish event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBroker;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_publish_wraps_payload_in_envelope() {
        let broker = Arc::new(InMemoryBroker::new());
        let publisher = EventPublisher::new(broker.clone(), "user.events", "users");

        publisher
            .publish("user.create", Operation::Create, &json!({"id": 1, "email": "a@b.c"}))
            .await;

        let published = broker.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].subject, "user.events.user.create");

        let body: Value = published[0].parse().unwrap();
        assert_eq!(body["type"], "CREATE");
        assert_eq!(body["source"], "users");
        assert_eq!(body["data"]["email"], "a@b.c");
    }

    #[tokio::test]
    async fn test_publish_swallows_broker_failure() {
        let broker = Arc::new(InMemoryBroker::unavailable());
        let publisher = EventPublisher::new(broker.clone(), "user.events", "users");

        publisher.publish("user.delete", Operation::Delete, &json!({"id": 1})).await;

        let err = publisher
            .try_publish("user.delete", Operation::Delete, &json!({"id": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, MessagingError::Unavailable(_)));
    }
}
