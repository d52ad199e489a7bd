//! Conversation message types.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::clock::Instant;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// Open, unordered bag of per-message tags.
///
/// Callers attach ad hoc keys not known in advance to this layer
/// (`topic`, `difficulty`, `command`, `code_execution`, `follow_up`, ...).
/// Values are any JSON scalar or nested mapping; no schema is enforced
/// beyond being serializable key/value pairs.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single message in a conversation history.
///
/// Created once by [`HistoryLog::append`](crate::session::HistoryLog::append)
/// and immutable thereafter. Metadata may be supplemented at creation time
/// only, never retroactively.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    /// The role of the message sender.
    pub role: Role,
    /// The content of the message.
    pub content: String,
    /// When the message was created, tagged with the session clock's offset.
    pub created_at: Instant,
    /// Time between session start and this message.
    pub elapsed_since_start: Duration,
    /// Free-form tags attached at creation time.
    pub metadata: Metadata,
}

impl MessageRecord {
    /// Returns the string value of a metadata key, if present and non-empty.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns true when a metadata key is the boolean `true`.
    pub fn metadata_flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}
