//! Chat send orchestration
//!
//! UI submit → accumulator opens → user message persisted → relay stream
//! opened → deltas folded in arrival order → reply finalized to the store.
//! Every failure path closes the stream and returns the accumulator to Idle;
//! dropping the delta stream releases the underlying connection.

use std::time::Duration;

use corpchat_models::{ChatMessage, OutboundMessage, Role, SendMessageRequest};
use futures::{Stream, StreamExt};

use crate::accumulator::ReplyAccumulator;
use crate::error::{ChatError, Result};
use crate::relay::RelayClient;
use crate::sse::delta_stream;
use crate::store::ThreadStore;

/// How the chat driver waits on an open stream.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Abort when no chunk arrives within this window. `None` waits forever,
    /// which leaves a never-closing upstream hanging the stream.
    pub idle_timeout: Option<Duration>,
}

async fn next_delta<S>(deltas: &mut S, idle_timeout: Option<Duration>) -> Result<Option<String>>
where
    S: Stream<Item = Result<String>> + Unpin,
{
    let next = match idle_timeout {
        Some(idle) => tokio::time::timeout(idle, deltas.next())
            .await
            .map_err(|_| ChatError::StreamIdle)?,
        None => deltas.next().await,
    };
    next.transpose()
}

/// Send one user message and stream the reply to completion.
///
/// Returns the persisted assistant message. On any failure the partial reply
/// (if any) stays visible on the accumulator and the error is surfaced once.
pub async fn send_message(
    accumulator: &mut ReplyAccumulator,
    relay: &RelayClient,
    store: &dyn ThreadStore,
    user_text: &str,
    options: &StreamOptions,
) -> Result<ChatMessage> {
    accumulator.begin(user_text)?;

    // Persist the user message before any provider traffic.
    if let Err(err) = store
        .append_message(
            accumulator.thread_id(),
            Role::User,
            user_text,
            accumulator.model(),
        )
        .await
    {
        accumulator.abort(&err.to_string());
        return Err(err);
    }

    // Everything before the empty bot marker forms the completion context.
    let messages = accumulator.messages();
    let context: Vec<OutboundMessage> = messages[..messages.len() - 1]
        .iter()
        .map(OutboundMessage::from)
        .collect();
    let request = SendMessageRequest::new(context).with_model(accumulator.model());

    let response = match relay.open_stream(&request).await {
        Ok(response) => response,
        Err(err) => {
            accumulator.abort(&err.to_string());
            return Err(err);
        }
    };

    let mut deltas = std::pin::pin!(delta_stream(response.bytes_stream()));
    loop {
        match next_delta(&mut deltas, options.idle_timeout).await {
            Ok(Some(delta)) => accumulator.apply_delta(&delta),
            Ok(None) => break,
            Err(err) => {
                accumulator.abort(&err.to_string());
                return Err(err);
            }
        }
    }

    accumulator.finalize(store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_store::MockThreadStore;
    use corpchat_models::Sender;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SSE_HELLO: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n",
        "data: [DONE]\n",
    );

    async fn relay_for(server: &MockServer) -> RelayClient {
        RelayClient::new(format!("{}/api/send_message", server.uri()))
    }

    #[tokio::test]
    async fn streams_reply_and_persists_both_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .and(body_partial_json(json!({
                "messages": [{ "role": "user", "content": "say hello" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_HELLO, "text/event-stream"))
            .mount(&server)
            .await;

        let store = MockThreadStore::new();
        let thread = store.seed_thread("Test").await;
        let mut accumulator = ReplyAccumulator::new(&thread, "gpt-3.5-turbo");

        let reply = send_message(
            &mut accumulator,
            &relay_for(&server).await,
            &store,
            "say hello",
            &StreamOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(reply.text, "Hello");
        assert_eq!(accumulator.messages().len(), 2);
        assert_eq!(accumulator.messages()[1], reply);

        let saved = store.messages(&thread).await;
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].sender, Sender::User);
        assert_eq!(saved[0].text, "say hello");
        assert_eq!(saved[1].sender, Sender::Bot);
        assert_eq!(saved[1].text, "Hello");
    }

    #[tokio::test]
    async fn upstream_rejection_aborts_after_user_persist() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": "OpenAI API Error: 429 - rate limited",
            })))
            .mount(&server)
            .await;

        let store = MockThreadStore::new();
        let thread = store.seed_thread("Test").await;
        let mut accumulator = ReplyAccumulator::new(&thread, "gpt-3.5-turbo");

        let err = send_message(
            &mut accumulator,
            &relay_for(&server).await,
            &store,
            "hi",
            &StreamOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ChatError::Upstream { status: 429, .. }));
        assert!(!accumulator.is_streaming());
        // Empty bot marker removed, user message kept and persisted.
        assert_eq!(accumulator.messages().len(), 1);
        assert_eq!(store.messages(&thread).await.len(), 1);
    }

    #[tokio::test]
    async fn user_persist_failure_never_reaches_the_relay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_HELLO, "text/event-stream"))
            .expect(0)
            .mount(&server)
            .await;

        let store = MockThreadStore::new();
        let thread = store.seed_thread("Test").await;
        store.fail_next(503, "store down").await;
        let mut accumulator = ReplyAccumulator::new(&thread, "gpt-3.5-turbo");

        let err = send_message(
            &mut accumulator,
            &relay_for(&server).await,
            &store,
            "hi",
            &StreamOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ChatError::Store { status: 503, .. }));
        assert!(!accumulator.is_streaming());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timeout_fires_when_no_chunk_arrives() {
        let mut pending =
            std::pin::pin!(futures::stream::pending::<Result<String>>());
        let err = next_delta(&mut pending, Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::StreamIdle));
    }
}
