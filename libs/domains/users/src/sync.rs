//! Applies user lifecycle events to the local store.

use async_trait::async_trait;
use messaging::{EventEnvelope, EventHandler, Operation, ProcessingError, ReceivedMessage};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::UserError;
use crate::models::{UpsertOutcome, UserEventPayload};
use crate::repository::UserRepository;

/// What an event did to the local store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Inserted(i32),
    Updated(i32),
    Deleted(i32),
    /// Delete for a user the store never had
    AlreadyAbsent(i32),
    /// Payload without an id
    MissingId,
    /// Event type this handler does not know
    UnknownType,
}

/// Keeps a replica of the users table in sync with published events.
///
/// Accepts `{type, data}` and `{type, user}` envelopes. Each event is applied
/// in its own transaction by the repository.
pub struct UserEventHandler<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserEventHandler<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Parse and apply one raw event body
    pub async fn apply(&self, body: &[u8]) -> Result<SyncOutcome, ProcessingError> {
        let envelope: EventEnvelope<Option<Value>> = serde_json::from_slice(body)?;

        let payload: UserEventPayload = match &envelope.data {
            Some(Value::Null) | None => UserEventPayload::default(),
            Some(data) => UserEventPayload::deserialize(data)?,
        };

        let Some(id) = payload.id else {
            debug!(event_id = %envelope.id, "Event without user id discarded");
            return Ok(SyncOutcome::MissingId);
        };

        let Some(operation) = envelope.operation() else {
            warn!(
                event_id = %envelope.id,
                event_type = %envelope.event_type,
                "Unknown event type discarded"
            );
            return Ok(SyncOutcome::UnknownType);
        };

        let outcome = match operation {
            Operation::Create | Operation::Update => {
                match self
                    .repository
                    .upsert_from_event(id, payload)
                    .await
                    .map_err(storage_error)?
                {
                    UpsertOutcome::Inserted => SyncOutcome::Inserted(id),
                    UpsertOutcome::Updated => SyncOutcome::Updated(id),
                }
            }
            Operation::Delete => {
                if self.repository.delete(id).await.map_err(storage_error)? {
                    SyncOutcome::Deleted(id)
                } else {
                    SyncOutcome::AlreadyAbsent(id)
                }
            }
        };

        info!(event_id = %envelope.id, operation = %operation, ?outcome, "Applied user event");
        Ok(outcome)
    }
}

fn storage_error(err: UserError) -> ProcessingError {
    ProcessingError::Storage(err.to_string())
}

#[async_trait]
impl<R: UserRepository + 'static> EventHandler for UserEventHandler<R> {
    async fn handle(&self, message: &ReceivedMessage) -> Result<(), ProcessingError> {
        self.apply(&message.payload).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "user_sync"
    }
}
