//! Corpchat client core
//!
//! This crate provides:
//! - Event-stream decoder turning provider bytes into text deltas
//! - Reply accumulator folding deltas into the in-progress bot message
//! - Relay client and the chat send orchestration
//! - Thread/message store adapter (REST)

pub mod accumulator;
pub mod chat;
pub mod error;
mod http;
pub mod relay;
pub mod session;
pub mod sse;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock_store;

// Re-export commonly used types
pub use accumulator::{ReplyAccumulator, StreamPhase, ThreadEvent};
pub use chat::{StreamOptions, send_message};
pub use error::{ChatError, Result};
pub use relay::RelayClient;
pub use session::Session;
pub use sse::{SseDecoder, delta_stream};
pub use store::{HttpThreadStore, ThreadStore};

#[cfg(any(test, feature = "test-utils"))]
pub use mock_store::MockThreadStore;
