//! Corpchat shared data model
//!
//! Plain serde types shared by the client library, the relay server and the
//! CLI. No I/O lives here.

pub mod message;
pub mod thread;
pub mod wire;

pub use message::{ChatMessage, Sender};
pub use thread::{ChatThread, ThreadSummary};
pub use wire::{OutboundMessage, Role, SendMessageRequest};
