//! Event consumer with bounded concurrency.

use crate::broker::{MessageBroker, ReceivedMessage};
use crate::error::{ErrorCategory, MessagingError, ProcessingError};
use crate::telemetry::MessagingMetrics;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Handles one message. Failures are logged by the consumer and the
/// message is dropped.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, message: &ReceivedMessage) -> Result<(), ProcessingError>;

    /// Used for logging.
    fn name(&self) -> &'static str;
}

/// Queue group name `{service}.{exchange}.{routing_key | "all"}`.
///
/// Wildcard tokens are spelled out (`*` becomes `any`, `>` becomes `all`)
/// so the name stays a plain identifier.
pub fn queue_name(service: &str, exchange: &str, routing_key: Option<&str>) -> String {
    let key = routing_key
        .map(|rk| {
            rk.split('.')
                .map(|token| match token {
                    "*" => "any",
                    ">" => "all",
                    other => other,
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_else(|| "all".to_string());

    format!("{}.{}.{}", service, exchange, key)
}

#[derive(Clone, Debug)]
pub struct ConsumerConfig {
    pub service_name: String,
    pub exchange: String,
    /// Binding such as `user.*`; `None` binds every subject under the exchange
    pub routing_key: Option<String>,
    /// Maximum messages processed concurrently
    pub prefetch: usize,
}

impl ConsumerConfig {
    pub fn subject(&self) -> String {
        match &self.routing_key {
            Some(rk) => format!("{}.{}", self.exchange, rk),
            None => format!("{}.>", self.exchange),
        }
    }

    pub fn queue_group(&self) -> String {
        queue_name(
            &self.service_name,
            &self.exchange,
            self.routing_key.as_deref(),
        )
    }
}

/// Subscribes with a queue group and dispatches messages to a handler.
pub struct Consumer<H: EventHandler> {
    broker: Arc<dyn MessageBroker>,
    handler: Arc<H>,
    config: ConsumerConfig,
    metrics: Arc<MessagingMetrics>,
}

impl<H: EventHandler> Consumer<H> {
    pub fn new(broker: Arc<dyn MessageBroker>, handler: H, config: ConsumerConfig) -> Self {
        let metrics = Arc::new(MessagingMetrics::new(&config.exchange));
        Self {
            broker,
            handler: Arc::new(handler),
            config,
            metrics,
        }
    }

    /// Run until `shutdown` flips to true or the subscription closes.
    ///
    /// In-flight messages are drained before returning.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), MessagingError> {
        let subject = self.config.subject();
        let queue_group = self.config.queue_group();
        let prefetch = self.config.prefetch.max(1);

        let mut stream = self.broker.queue_subscribe(&subject, &queue_group).await?;

        info!(
            subject = %subject,
            queue_group = %queue_group,
            prefetch = prefetch,
            handler = self.handler.name(),
            "Consumer started"
        );

        let semaphore = Arc::new(Semaphore::new(prefetch));
        let mut in_flight = JoinSet::new();

        let outcome = loop {
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    error!(error = %e, "Message task panicked");
                }
            }

            let permit = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received, stopping consumer");
                        break Ok(());
                    }
                    continue;
                }
                permit = semaphore.clone().acquire_owned() => permit
                    .map_err(|e| MessagingError::ConsumerStopped(e.to_string()))?,
            };

            let message = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received, stopping consumer");
                        break Ok(());
                    }
                    continue;
                }
                message = stream.next() => message,
            };

            let Some(message) = message else {
                warn!(subject = %subject, "Subscription closed");
                break Err(MessagingError::ConsumerStopped(format!(
                    "subscription to {} closed",
                    subject
                )));
            };

            self.metrics.message_received();
            let handler = self.handler.clone();
            let metrics = self.metrics.clone();

            in_flight.spawn(async move {
                process_message(handler.as_ref(), metrics.as_ref(), message).await;
                drop(permit);
            });
        };

        let pending = in_flight.len();
        if pending > 0 {
            info!(pending, "Draining in-flight messages");
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Message task panicked");
            }
        }

        info!("Consumer stopped");
        outcome
    }
}

async fn process_message<H: EventHandler>(
    handler: &H,
    metrics: &MessagingMetrics,
    message: ReceivedMessage,
) {
    let start = Instant::now();
    match handler.handle(&message).await {
        Ok(()) => {
            let duration = start.elapsed();
            metrics.message_processed(duration);
            debug!(
                subject = %message.subject,
                duration_ms = duration.as_millis(),
                "Message processed"
            );
        }
        Err(e) => {
            let category = e.category();
            metrics.message_failed(category);
            match category {
                ErrorCategory::Permanent => warn!(
                    subject = %message.subject,
                    handler = handler.name(),
                    error = %e,
                    "Discarding unprocessable message"
                ),
                ErrorCategory::Transient => error!(
                    subject = %message.subject,
                    handler = handler.name(),
                    error = %e,
                    "Message processing failed, discarding"
                ),
            }
        }
    }
}
