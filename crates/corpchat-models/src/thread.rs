use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// Thread listing shape: id and title only, messages are loaded on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub title: String,
}

/// A persisted conversation with its ordered message history.
///
/// `thread_id` is assigned by the backend on creation; the client never
/// invents a permanent id before the create call returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatThread {
    pub thread_id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatThread {
    pub fn new(thread_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            title: title.into(),
            messages: Vec::new(),
        }
    }

    pub fn summary(&self) -> ThreadSummary {
        ThreadSummary {
            thread_id: self.thread_id.clone(),
            title: self.title.clone(),
        }
    }
}
