//! Wire types for the relay endpoint.

use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, Sender};

/// Chat completion role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the completion request forwarded to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for OutboundMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: match message.sender {
                Sender::User => Role::User,
                Sender::Bot => Role::Assistant,
            },
            content: message.text.clone(),
        }
    }
}

/// Body of `POST /api/send_message`.
///
/// Field names match the original JSON protocol (`fileIds` camelCase).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub messages: Vec<OutboundMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
}

impl SendMessageRequest {
    pub fn new(messages: Vec<OutboundMessage>) -> Self {
        Self {
            messages,
            model: None,
            file_ids: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_file_ids(mut self, file_ids: Vec<String>) -> Self {
        self.file_ids = file_ids;
        self
    }
}
