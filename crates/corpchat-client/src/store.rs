//! Thread/message store adapter
//!
//! The store is an external REST collaborator: thread CRUD and message
//! persistence. Failures are surfaced once with the backend's status and
//! body; nothing here retries.

use async_trait::async_trait;
use corpchat_models::{ChatMessage, ChatThread, Role, Sender, ThreadSummary};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::http::build_http_client;
use crate::session::Session;

/// Store operations consumed by the chat core.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn create_thread(&self, title: &str, model: &str) -> Result<ChatThread>;
    async fn list_threads(&self) -> Result<Vec<ThreadSummary>>;
    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<()>;
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>>;
    async fn append_message(
        &self,
        thread_id: &str,
        role: Role,
        text: &str,
        model: &str,
    ) -> Result<ChatMessage>;
}

// Wire shapes of the store REST surface. Thread and message ids are numeric
// on the backend and stringified on our side.

#[derive(Deserialize)]
struct ChatDto {
    id: i64,
    title: String,
}

#[derive(Serialize)]
struct ChatUpsertDto<'a> {
    title: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_used: Option<&'a str>,
}

#[derive(Deserialize)]
struct MessageDto {
    id: i64,
    role: String,
    content: String,
}

#[derive(Serialize)]
struct MessageCreateDto<'a> {
    role: &'a str,
    content: &'a str,
    model_used: &'a str,
    chat_id: i64,
}

impl From<MessageDto> for ChatMessage {
    fn from(dto: MessageDto) -> Self {
        Self {
            id: dto.id.to_string(),
            text: dto.content,
            sender: if dto.role == "user" {
                Sender::User
            } else {
                Sender::Bot
            },
        }
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// REST implementation of [`ThreadStore`], bearer-authenticated through an
/// explicit [`Session`].
pub struct HttpThreadStore {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpThreadStore {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn chat_id(thread_id: &str) -> Result<i64> {
        thread_id
            .parse::<i64>()
            .map_err(|_| ChatError::InvalidThreadId(thread_id.to_string()))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ChatError::Store {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ThreadStore for HttpThreadStore {
    async fn create_thread(&self, title: &str, model: &str) -> Result<ChatThread> {
        let response = self
            .client
            .post(format!("{}/chats/", self.base_url))
            .header("Authorization", self.session.bearer())
            .json(&ChatUpsertDto {
                title,
                status: "active",
                model_used: Some(model),
            })
            .send()
            .await?;
        let dto: ChatDto = Self::check(response).await?.json().await?;
        Ok(ChatThread::new(dto.id.to_string(), dto.title))
    }

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>> {
        let response = self
            .client
            .get(format!("{}/chats/me", self.base_url))
            .header("Authorization", self.session.bearer())
            .send()
            .await?;
        let dtos: Vec<ChatDto> = Self::check(response).await?.json().await?;
        Ok(dtos
            .into_iter()
            .map(|dto| ThreadSummary {
                thread_id: dto.id.to_string(),
                title: dto.title,
            })
            .collect())
    }

    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<()> {
        let response = self
            .client
            .put(format!("{}/chats/{thread_id}", self.base_url))
            .header("Authorization", self.session.bearer())
            .json(&ChatUpsertDto {
                title,
                status: "active",
                model_used: None,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/chats/{thread_id}", self.base_url))
            .header("Authorization", self.session.bearer())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let response = self
            .client
            .get(format!("{}/messages/", self.base_url))
            .query(&[("chat_id", thread_id)])
            .header("Authorization", self.session.bearer())
            .send()
            .await?;
        let dtos: Vec<MessageDto> = Self::check(response).await?.json().await?;
        Ok(dtos.into_iter().map(ChatMessage::from).collect())
    }

    async fn append_message(
        &self,
        thread_id: &str,
        role: Role,
        text: &str,
        model: &str,
    ) -> Result<ChatMessage> {
        let chat_id = Self::chat_id(thread_id)?;
        let response = self
            .client
            .post(format!("{}/messages/", self.base_url))
            .header("Authorization", self.session.bearer())
            .json(&MessageCreateDto {
                role: role_str(role),
                content: text,
                model_used: model,
                chat_id,
            })
            .send()
            .await?;
        let dto: MessageDto = Self::check(response).await?.json().await?;
        Ok(dto.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> HttpThreadStore {
        HttpThreadStore::new(server.uri(), Session::new("token-1"))
    }

    #[tokio::test]
    async fn create_thread_maps_backend_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats/"))
            .and(header("Authorization", "Bearer token-1"))
            .and(body_partial_json(json!({
                "title": "First",
                "status": "active",
                "model_used": "gpt-3.5-turbo",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "title": "First",
            })))
            .mount(&server)
            .await;

        let thread = store_for(&server)
            .create_thread("First", "gpt-3.5-turbo")
            .await
            .unwrap();
        assert_eq!(thread.thread_id, "42");
        assert_eq!(thread.title, "First");
        assert!(thread.messages.is_empty());
    }

    #[tokio::test]
    async fn list_messages_maps_roles_to_senders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/"))
            .and(query_param("chat_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "role": "user", "content": "hi" },
                { "id": 2, "role": "assistant", "content": "hello" },
            ])))
            .mount(&server)
            .await;

        let messages = store_for(&server).list_messages("42").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].id, "2");
    }

    #[tokio::test]
    async fn append_message_sends_store_wire_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages/"))
            .and(body_partial_json(json!({
                "role": "assistant",
                "content": "answer",
                "model_used": "gpt-3.5-turbo",
                "chat_id": 42,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9,
                "role": "assistant",
                "content": "answer",
            })))
            .mount(&server)
            .await;

        let message = store_for(&server)
            .append_message("42", Role::Assistant, "answer", "gpt-3.5-turbo")
            .await
            .unwrap();
        assert_eq!(message.id, "9");
        assert_eq!(message.sender, Sender::Bot);
    }

    #[tokio::test]
    async fn non_success_status_maps_to_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chats/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = store_for(&server).list_threads().await.unwrap_err();
        match err {
            ChatError::Store { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_numeric_thread_id_is_rejected_before_any_call() {
        let server = MockServer::start().await;
        let err = store_for(&server)
            .append_message("not-a-number", Role::User, "hi", "gpt-3.5-turbo")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidThreadId(_)));
    }
}
