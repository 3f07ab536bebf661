//! Event envelope and lifecycle operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle operation carried in the envelope `type` field.
///
/// Parsing accepts the legacy `user_created` / `user_updated` / `user_deleted`
/// names and is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Operation {
    #[strum(to_string = "CREATE", serialize = "user_created")]
    Create,
    #[strum(to_string = "UPDATE", serialize = "user_updated")]
    Update,
    #[strum(to_string = "DELETE", serialize = "user_deleted")]
    Delete,
}

impl Operation {
    /// Routing key for an entity, e.g. `user.create`.
    pub fn routing_key(&self, entity: &str) -> String {
        format!("{}.{}", entity, self.to_string().to_ascii_lowercase())
    }
}

/// Event envelope containing metadata and payload.
///
/// Serialized as `{id, type, source, timestamp, data}`. Incoming envelopes
/// may use `user` in place of `data`; missing metadata is filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Unique event ID
    #[serde(default = "new_event_id")]
    pub id: String,
    /// Operation name, see [`Operation`]
    #[serde(rename = "type")]
    pub event_type: String,
    /// Source service
    #[serde(default)]
    pub source: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// The actual event payload
    #[serde(alias = "user")]
    pub data: T,
}

fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl<T> EventEnvelope<T> {
    pub fn new(operation: Operation, source: impl Into<String>, data: T) -> Self {
        Self {
            id: new_event_id(),
            event_type: operation.to_string(),
            source: source.into(),
            timestamp: Utc::now(),
            data,
        }
    }

    /// Parsed operation, `None` for unknown types.
    pub fn operation(&self) -> Option<Operation> {
        self.event_type.parse().ok()
    }
}
