//! In-process broker.

use crate::broker::{subject_matches, MessageBroker, MessageStream, ReceivedMessage};
use crate::error::MessagingError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

struct Subscription {
    pattern: String,
    queue_group: Option<String>,
    tx: mpsc::UnboundedSender<ReceivedMessage>,
}

#[derive(Default)]
struct Inner {
    published: Vec<ReceivedMessage>,
    subscriptions: Vec<Subscription>,
    round_robin: usize,
}

/// Broker that delivers within the current process.
///
/// Follows NATS semantics: plain subscribers all receive a copy, queue
/// groups receive one copy per group. Every publish is also recorded and
/// can be inspected with [`InMemoryBroker::published`].
pub struct InMemoryBroker {
    inner: Mutex<Inner>,
    available: AtomicBool,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// A broker whose publishes and subscriptions fail with `Unavailable`.
    pub fn unavailable() -> Self {
        let broker = Self::new();
        broker.set_available(false);
        broker
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Messages published so far, in order.
    pub fn published(&self) -> Vec<ReceivedMessage> {
        self.lock().published.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_available(&self) -> Result<(), MessagingError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MessagingError::Unavailable(
                "in-memory broker marked unavailable".to_string(),
            ))
        }
    }

    fn add_subscription(&self, subject: &str, queue_group: Option<&str>) -> Box<dyn MessageStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscriptions.push(Subscription {
            pattern: subject.to_string(),
            queue_group: queue_group.map(str::to_string),
            tx,
        });
        Box::new(InMemoryStream { rx })
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    async fn publish_raw(&self, subject: &str, payload: &[u8]) -> Result<(), MessagingError> {
        self.ensure_available()?;

        let message = ReceivedMessage::new(subject, payload.to_vec());
        let mut inner = self.lock();
        inner.subscriptions.retain(|s| !s.tx.is_closed());
        inner.published.push(message.clone());

        let offset = inner.round_robin;
        inner.round_robin = inner.round_robin.wrapping_add(1);

        let matching: Vec<&Subscription> = inner
            .subscriptions
            .iter()
            .filter(|s| subject_matches(&s.pattern, subject))
            .collect();

        let mut served_groups = HashSet::new();
        for sub in matching.iter().filter(|s| s.queue_group.is_none()) {
            let _ = sub.tx.send(message.clone());
        }

        for group in matching.iter().filter_map(|s| s.queue_group.as_deref()) {
            if !served_groups.insert(group) {
                continue;
            }
            let members: Vec<&&Subscription> = matching
                .iter()
                .filter(|s| s.queue_group.as_deref() == Some(group))
                .collect();
            let _ = members[offset % members.len()].tx.send(message.clone());
        }

        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn MessageStream>, MessagingError> {
        self.ensure_available()?;
        Ok(self.add_subscription(subject, None))
    }

    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Box<dyn MessageStream>, MessagingError> {
        self.ensure_available()?;
        Ok(self.add_subscription(subject, Some(queue_group)))
    }

    fn is_connected(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

struct InMemoryStream {
    rx: mpsc::UnboundedReceiver<ReceivedMessage>,
}

#[async_trait]
impl MessageStream for InMemoryStream {
    async fn next(&mut self) -> Option<ReceivedMessage> {
        self.rx.recv().await
    }
}
