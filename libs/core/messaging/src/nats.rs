//! NATS implementation of the MessageBroker trait

use crate::broker::{MessageBroker, MessageStream, ReceivedMessage};
use crate::error::MessagingError;
use async_nats::connection::State;
use async_nats::{Client, Subscriber};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use tracing::{debug, instrument};

/// NATS-based message broker implementation
pub struct NatsBroker {
    client: Client,
}

impl NatsBroker {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        let client = async_nats::connect(url)
            .await
            .wrap_err_with(|| format!("Failed to connect to NATS at {}", url))?;

        Ok(Self { client })
    }

    /// Connect with a client name visible in server monitoring
    pub async fn connect_with_name(url: &str, name: &str) -> Result<Self> {
        let client = async_nats::ConnectOptions::new()
            .name(name)
            .connect(url)
            .await
            .wrap_err_with(|| format!("Failed to connect to NATS at {}", url))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MessageBroker for NatsBroker {
    #[instrument(skip(self, payload), fields(subject = %subject, bytes = payload.len()))]
    async fn publish_raw(&self, subject: &str, payload: &[u8]) -> Result<(), MessagingError> {
        self.client
            .publish(subject.to_string(), payload.to_vec().into())
            .await
            .map_err(|e| MessagingError::Unavailable(e.to_string()))?;

        debug!("Published message");
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn MessageStream>, MessagingError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| MessagingError::Subscribe {
                subject: subject.to_string(),
                message: e.to_string(),
            })?;

        Ok(Box::new(NatsMessageStream { subscriber }))
    }

    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Box<dyn MessageStream>, MessagingError> {
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| MessagingError::Subscribe {
                subject: subject.to_string(),
                message: e.to_string(),
            })?;

        Ok(Box::new(NatsMessageStream { subscriber }))
    }

    fn is_connected(&self) -> bool {
        self.client.connection_state() == State::Connected
    }

    async fn close(&self) -> Result<(), MessagingError> {
        self.client
            .flush()
            .await
            .map_err(|e| MessagingError::Unavailable(e.to_string()))
    }
}

/// NATS message stream wrapper
struct NatsMessageStream {
    subscriber: Subscriber,
}

#[async_trait]
impl MessageStream for NatsMessageStream {
    async fn next(&mut self) -> Option<ReceivedMessage> {
        use futures::StreamExt;

        self.subscriber.next().await.map(|msg| ReceivedMessage {
            subject: msg.subject.to_string(),
            payload: msg.payload.to_vec(),
            reply: msg.reply.map(|s| s.to_string()),
        })
    }
}
