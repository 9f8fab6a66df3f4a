//! Deterministic in-memory store for accumulator and orchestration tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use corpchat_models::{ChatMessage, ChatThread, Role, Sender, ThreadSummary};
use tokio::sync::Mutex;

use crate::error::{ChatError, Result};
use crate::store::ThreadStore;

#[derive(Debug, Default)]
struct MockState {
    threads: Vec<ChatThread>,
    next_id: i64,
    failures: VecDeque<(u16, String)>,
}

impl MockState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn fail_if_scripted(&mut self) -> Result<()> {
        if let Some((status, message)) = self.failures.pop_front() {
            return Err(ChatError::Store { status, message });
        }
        Ok(())
    }

    fn thread_mut(&mut self, thread_id: &str) -> Result<&mut ChatThread> {
        self.threads
            .iter_mut()
            .find(|thread| thread.thread_id == thread_id)
            .ok_or_else(|| ChatError::Store {
                status: 404,
                message: format!("thread {thread_id} not found"),
            })
    }
}

/// In-memory [`ThreadStore`] with scripted failures.
#[derive(Debug, Clone, Default)]
pub struct MockThreadStore {
    state: Arc<Mutex<MockState>>,
}

impl MockThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next store call to fail with the given status and body.
    pub async fn fail_next(&self, status: u16, message: &str) {
        self.state
            .lock()
            .await
            .failures
            .push_back((status, message.to_string()));
    }

    /// Create a thread directly, bypassing the scripted failures.
    pub async fn seed_thread(&self, title: &str) -> String {
        let mut state = self.state.lock().await;
        let id = state.next_id().to_string();
        state.threads.push(ChatThread::new(&id, title));
        id
    }

    /// Peek at everything persisted for a thread.
    pub async fn messages(&self, thread_id: &str) -> Vec<ChatMessage> {
        let state = self.state.lock().await;
        state
            .threads
            .iter()
            .find(|thread| thread.thread_id == thread_id)
            .map(|thread| thread.messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ThreadStore for MockThreadStore {
    async fn create_thread(&self, title: &str, _model: &str) -> Result<ChatThread> {
        let mut state = self.state.lock().await;
        state.fail_if_scripted()?;
        let id = state.next_id().to_string();
        let thread = ChatThread::new(id, title);
        state.threads.push(thread.clone());
        Ok(thread)
    }

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>> {
        let mut state = self.state.lock().await;
        state.fail_if_scripted()?;
        Ok(state.threads.iter().map(ChatThread::summary).collect())
    }

    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.fail_if_scripted()?;
        state.thread_mut(thread_id)?.title = title.to_string();
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.fail_if_scripted()?;
        state.thread_mut(thread_id)?;
        state.threads.retain(|thread| thread.thread_id != thread_id);
        Ok(())
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let mut state = self.state.lock().await;
        state.fail_if_scripted()?;
        Ok(state.thread_mut(thread_id)?.messages.clone())
    }

    async fn append_message(
        &self,
        thread_id: &str,
        role: Role,
        text: &str,
        _model: &str,
    ) -> Result<ChatMessage> {
        let mut state = self.state.lock().await;
        state.fail_if_scripted()?;
        let id = state.next_id().to_string();
        let message = ChatMessage {
            id,
            text: text.to_string(),
            sender: match role {
                Role::User => Sender::User,
                _ => Sender::Bot,
            },
        };
        state.thread_mut(thread_id)?.messages.push(message.clone());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn crud_round_trip() {
        let store = MockThreadStore::new();
        let thread = store.create_thread("First", "gpt-3.5-turbo").await.unwrap();

        store.rename_thread(&thread.thread_id, "Renamed").await.unwrap();
        let listed = store.list_threads().await.unwrap();
        assert_eq!(listed[0].title, "Renamed");

        store.delete_thread(&thread.thread_id).await.unwrap();
        assert!(store.list_threads().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scripted_failure_applies_to_next_call_only() {
        let store = MockThreadStore::new();
        store.fail_next(500, "boom").await;
        assert!(store.list_threads().await.is_err());
        assert!(store.list_threads().await.is_ok());
    }

    #[tokio::test]
    async fn unknown_thread_is_a_404() {
        let store = MockThreadStore::new();
        let err = store.list_messages("99").await.unwrap_err();
        assert!(matches!(err, ChatError::Store { status: 404, .. }));
    }
}
