//! Client side of the stream relay endpoint.

use corpchat_models::SendMessageRequest;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{ChatError, Result};
use crate::http::build_http_client;

#[derive(Deserialize)]
struct RelayErrorBody {
    error: String,
}

/// Posts completion requests to the relay and hands back the raw event
/// stream.
pub struct RelayClient {
    client: Client,
    endpoint: String,
}

impl RelayClient {
    /// `endpoint` is the full URL of the relay's send-message route.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            endpoint: endpoint.into(),
        }
    }

    /// Open a reply stream. Single attempt: a non-success response is decoded
    /// from the relay's `{"error": …}` payload into
    /// [`ChatError::Upstream`] and never retried.
    pub async fn open_stream(&self, request: &SendMessageRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RelayErrorBody>(&body)
                .map(|payload| payload.error)
                .unwrap_or(body);
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpchat_models::{OutboundMessage, Role};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SendMessageRequest {
        SendMessageRequest::new(vec![OutboundMessage {
            role: Role::User,
            content: "hi".to_string(),
        }])
        .with_model("gpt-3.5-turbo")
    }

    #[tokio::test]
    async fn error_payload_becomes_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": "OpenAI API Error: 429 - rate limited",
            })))
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/api/send_message", server.uri()));
        let err = client.open_stream(&request()).await.unwrap_err();
        match err {
            ChatError::Upstream { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "OpenAI API Error: 429 - rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn success_hands_back_the_byte_stream() {
        let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"X\"}}]}\n\ndata: [DONE]\n";
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .and(body_partial_json(json!({ "model": "gpt-3.5-turbo" })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/api/send_message", server.uri()));
        let response = client.open_stream(&request()).await.unwrap();
        let body = response.text().await.unwrap();
        assert_eq!(body, sse);
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/api/send_message", server.uri()));
        let err = client.open_stream(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Upstream { status: 502, ref message } if message == "bad gateway"
        ));
    }
}
