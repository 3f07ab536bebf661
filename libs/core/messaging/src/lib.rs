//! Messaging for user lifecycle events.
//!
//! - **Broker**: object-safe [`MessageBroker`] with NATS and in-memory backends
//! - **Publishing**: [`EventPublisher`] wraps payloads in an [`EventEnvelope`]
//!   and publishes best-effort
//! - **Consuming**: [`Consumer`] dispatches queue-group messages to an
//!   [`EventHandler`] with bounded concurrency
//! - **Operations**: Prometheus metrics and a probe server for workers
//!
//! # Subjects
//!
//! ```text
//! {exchange}.{entity}.{operation}      e.g. user.events.user.create
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let broker: Arc<dyn MessageBroker> = Arc::new(NatsBroker::connect(&url).await?);
//! let publisher = EventPublisher::new(broker.clone(), "user.events", "users");
//! publisher.publish("user.create", Operation::Create, &payload).await;
//! ```

mod broker;
mod config;
mod consumer;
mod envelope;
mod error;
mod health;
mod memory;
mod nats;
mod publisher;
pub mod telemetry;

pub use broker::{subject_matches, MessageBroker, MessageStream, ReceivedMessage};
pub use config::{BrokerConfig, DEFAULT_EXCHANGE, DEFAULT_NATS_URL};
pub use consumer::{queue_name, Consumer, ConsumerConfig, EventHandler};
pub use envelope::{EventEnvelope, Operation};
pub use error::{ErrorCategory, MessagingError, ProcessingError};
pub use health::{HealthServer, HealthState, HealthStatus};
pub use memory::InMemoryBroker;
pub use nats::NatsBroker;
pub use publisher::EventPublisher;
pub use telemetry::{init_metrics, MessagingMetrics};
