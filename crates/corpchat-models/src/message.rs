use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single message inside a thread.
///
/// `text` is mutable only while the message is the trailing in-progress bot
/// message of an open stream; once finalized it never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    /// Create a user message with a fresh local id.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender: Sender::User,
        }
    }

    /// Create an empty bot message marker with a fresh local id.
    pub fn bot_marker() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: String::new(),
            sender: Sender::Bot,
        }
    }
}
