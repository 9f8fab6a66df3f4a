//! Reply accumulator
//!
//! Explicit two-state machine folding decoded deltas into the single
//! in-progress bot message of one thread. The accumulator is the sole writer
//! of the in-progress message; rendering layers subscribe to [`ThreadEvent`]s
//! instead of driving the logic.

use corpchat_models::{ChatMessage, Role, Sender};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::error::{ChatError, Result};
use crate::store::ThreadStore;

/// Stream phase of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Streaming,
}

/// Notification emitted towards the rendering layer.
#[derive(Debug, Clone)]
pub enum ThreadEvent {
    /// A message was appended to the visible list.
    MessageAppended(ChatMessage),
    /// The in-progress bot message grew; carries the updated snapshot.
    MessageUpdated(ChatMessage),
    /// The stream ended and the reply was persisted.
    StreamFinished(ChatMessage),
    /// The stream or its persistence failed; partial text stays visible.
    StreamFailed { message: String },
}

/// Accumulates one streamed reply at a time for a single thread.
pub struct ReplyAccumulator {
    thread_id: String,
    model: String,
    messages: Vec<ChatMessage>,
    phase: StreamPhase,
    events: Option<UnboundedSender<ThreadEvent>>,
}

impl ReplyAccumulator {
    pub fn new(thread_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            model: model.into(),
            messages: Vec::new(),
            phase: StreamPhase::Idle,
            events: None,
        }
    }

    /// Seed the visible list with previously persisted messages.
    pub fn with_history(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Subscribe to thread events. Replaces any previous subscription.
    pub fn subscribe(&mut self) -> UnboundedReceiver<ThreadEvent> {
        let (sender, receiver) = unbounded_channel();
        self.events = Some(sender);
        receiver
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn is_streaming(&self) -> bool {
        self.phase == StreamPhase::Streaming
    }

    /// The visible message list, in chronological order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Open a stream: append the user message and an empty bot marker.
    ///
    /// Rejected with [`ChatError::StreamBusy`] while a stream is already
    /// open; callers should disable submit instead of queueing.
    pub fn begin(&mut self, user_text: &str) -> Result<()> {
        if self.phase == StreamPhase::Streaming {
            return Err(ChatError::StreamBusy);
        }

        let user = ChatMessage::user(user_text);
        self.emit(ThreadEvent::MessageAppended(user.clone()));
        self.messages.push(user);

        let marker = ChatMessage::bot_marker();
        self.emit(ThreadEvent::MessageAppended(marker.clone()));
        self.messages.push(marker);

        self.phase = StreamPhase::Streaming;
        Ok(())
    }

    /// Fold one delta onto the in-progress bot message, replacing it in
    /// place. Deltas arriving while no stream is open are dropped.
    pub fn apply_delta(&mut self, delta: &str) {
        if self.phase != StreamPhase::Streaming {
            tracing::warn!(thread_id = %self.thread_id, "dropping delta: no open stream");
            return;
        }
        // begin() guarantees the trailing bot marker exists.
        let Some(message) = self.messages.last_mut() else {
            return;
        };
        message.text.push_str(delta);
        let snapshot = message.clone();
        self.emit(ThreadEvent::MessageUpdated(snapshot));
    }

    /// Close the stream and persist the completed reply through the store.
    ///
    /// On persistence failure the in-memory text is kept (no rollback) and
    /// the error is returned so callers can offer a retry. The phase returns
    /// to Idle on every path.
    pub async fn finalize(&mut self, store: &dyn ThreadStore) -> Result<ChatMessage> {
        if self.phase != StreamPhase::Streaming {
            return Err(ChatError::StreamClosed);
        }
        self.phase = StreamPhase::Idle;

        let index = self.messages.len() - 1;
        let text = self.messages[index].text.clone();

        match store
            .append_message(&self.thread_id, Role::Assistant, &text, &self.model)
            .await
        {
            Ok(persisted) => {
                self.messages[index] = persisted.clone();
                self.emit(ThreadEvent::StreamFinished(persisted.clone()));
                Ok(persisted)
            }
            Err(err) => {
                tracing::error!(
                    thread_id = %self.thread_id,
                    error = %err,
                    "failed to persist assistant reply"
                );
                self.emit(ThreadEvent::StreamFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Close the stream after a mid-stream failure.
    ///
    /// Partial text stays visible so the renderer can show an inline error;
    /// an empty bot marker is removed instead.
    pub fn abort(&mut self, reason: &str) {
        if self.phase != StreamPhase::Streaming {
            return;
        }
        self.phase = StreamPhase::Idle;
        if let Some(last) = self.messages.last()
            && last.sender == Sender::Bot
            && last.text.is_empty()
        {
            self.messages.pop();
        }
        self.emit(ThreadEvent::StreamFailed {
            message: reason.to_string(),
        });
    }

    fn emit(&self, event: ThreadEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver just means nobody is rendering.
            let _ = events.send(event);
        }
    }
}
