//! Direct message structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of client-assigned ids carried by optimistic placeholders.
///
/// Durable ids are assigned by the store and never start with it.
pub const PENDING_ID_PREFIX: &str = "pending:";

/// A single chat entry between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned id, or a `pending:` id while the write is in flight
    pub id: String,
    /// Author of the message
    pub sender_id: String,
    /// Addressee of the message
    pub receiver_id: String,
    /// Trimmed, non-empty text payload
    pub content: String,
    /// Whether the receiver has read the message
    #[serde(default)]
    pub is_read: bool,
    /// Creation time (server clock once durable)
    pub created_at: DateTime<Utc>,
    /// Idempotency token of the insert that created this row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<Uuid>,
}

impl Message {
    /// Build an optimistic placeholder for an outbound message
    ///
    /// The placeholder gets a fresh non-durable id, the current time and a new
    /// idempotency token which is forwarded with the durable write.
    pub fn pending(sender_id: &str, receiver_id: &str, content: &str) -> Self {
        Self {
            id: format!("{}{}", PENDING_ID_PREFIX, Uuid::new_v4()),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now(),
            client_token: Some(Uuid::new_v4()),
        }
    }

    /// Whether this is a local placeholder not yet confirmed by the store
    pub fn is_pending(&self) -> bool {
        self.id.starts_with(PENDING_ID_PREFIX)
    }

    /// Whether the message belongs to the conversation between `a` and `b`
    ///
    /// The pair is unordered: either participant may be the sender.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// Get human-readable delivery status indicator
    pub fn status_indicator(&self) -> &str {
        if self.is_pending() {
            "…"
        } else if self.is_read {
            "✓✓"
        } else {
            "✓"
        }
    }
}

/// Insert payload for the message store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Author of the message
    pub sender_id: String,
    /// Addressee of the message
    pub receiver_id: String,
    /// Trimmed, non-empty text payload
    pub content: String,
    /// Token letting the store recognise a replayed insert
    pub client_token: Uuid,
}

impl NewMessage {
    /// Derive the insert payload from an optimistic placeholder
    pub fn from_pending(placeholder: &Message) -> Self {
        Self {
            sender_id: placeholder.sender_id.clone(),
            receiver_id: placeholder.receiver_id.clone(),
            content: placeholder.content.clone(),
            client_token: placeholder.client_token.unwrap_or_else(Uuid::new_v4),
        }
    }
}
