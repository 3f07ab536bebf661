//! Broker abstraction.
//!
//! Backends:
//! - NATS core pub/sub ([`NatsBroker`](crate::NatsBroker))
//! - In-process ([`InMemoryBroker`](crate::InMemoryBroker)) for tests and local runs

use crate::error::MessagingError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Received message with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Subject the message was published on
    pub subject: String,
    /// Raw payload bytes
    pub payload: Vec<u8>,
    /// Reply subject for request-reply patterns
    pub reply: Option<String>,
}

impl ReceivedMessage {
    pub fn new(subject: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
            reply: None,
        }
    }

    /// Deserialize the payload
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Abstract message broker interface.
///
/// Object safe so the process entry point can own one connection and hand
/// `Arc<dyn MessageBroker>` to publishers and consumers.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publish raw bytes to a subject
    async fn publish_raw(&self, subject: &str, payload: &[u8]) -> Result<(), MessagingError>;

    /// Subscribe to a subject (wildcards allowed)
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn MessageStream>, MessagingError>;

    /// Queue group subscription: each message goes to one member of the group
    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Box<dyn MessageStream>, MessagingError>;

    /// Whether the broker connection is currently usable
    fn is_connected(&self) -> bool;

    /// Flush buffered publishes before shutdown
    async fn close(&self) -> Result<(), MessagingError> {
        Ok(())
    }
}

/// Stream of incoming messages
#[async_trait]
pub trait MessageStream: Send {
    /// Receive the next message; `None` once the subscription is closed
    async fn next(&mut self) -> Option<ReceivedMessage>;
}

/// NATS subject matching: `*` matches one token, `>` matches one or more trailing tokens.
pub fn subject_matches(pattern: &str, subject: &str) -> bool {
    let mut pattern_tokens = pattern.split('.');
    let mut subject_tokens = subject.split('.');

    loop {
        match (pattern_tokens.next(), subject_tokens.next()) {
            (Some(">"), Some(_)) => return true,
            (Some("*"), Some(_)) => continue,
            (Some(p), Some(s)) if p == s => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_matches_literal() {
        assert!(subject_matches("user.events.user.create", "user.events.user.create"));
        assert!(!subject_matches("user.events.user.create", "user.events.user.delete"));
    }

    #[test]
    fn test_subject_matches_single_token_wildcard() {
        assert!(subject_matches("user.events.user.*", "user.events.user.update"));
        assert!(!subject_matches("user.events.user.*", "user.events.user"));
        assert!(!subject_matches("user.events.*", "user.events.user.update"));
    }

    #[test]
    fn test_subject_matches_tail_wildcard() {
        assert!(subject_matches("user.events.>", "user.events.user.delete"));
        assert!(!subject_matches("user.events.>", "user.events"));
        assert!(!subject_matches("user.events.>", "orders.events.created"));
    }

    #[test]
    fn test_received_message_parse() {
        let msg = ReceivedMessage::new("s", br#"{"id": 3}"#.to_vec());
        let value: serde_json::Value = msg.parse().unwrap();
        assert_eq!(value["id"], 3);
    }
}
