//! Error types for the chat client

use thiserror::Error;

/// Chat client error types
#[derive(Error, Debug)]
pub enum ChatError {
    /// Non-success status from the model provider, surfaced through the relay.
    /// Never retried; the message carries the provider's error body verbatim.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status from the thread/message store.
    #[error("store error ({status}): {message}")]
    Store { status: u16, message: String },

    #[error("invalid thread id: {0}")]
    InvalidThreadId(String),

    /// A submit arrived while a reply stream was already open on the thread.
    #[error("a reply stream is already in progress for this thread")]
    StreamBusy,

    /// A stream operation was called while no stream was open.
    #[error("no reply stream is open for this thread")]
    StreamClosed,

    /// No chunk arrived within the configured idle timeout.
    #[error("reply stream idle timeout expired")]
    StreamIdle,
}

/// Result type alias for chat client operations
pub type Result<T> = std::result::Result<T, ChatError>;
