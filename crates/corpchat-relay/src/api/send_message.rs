use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use corpchat_models::SendMessageRequest;
use serde_json::json;

use super::state::AppState;

// POST /api/send_message
//
// The body is read raw and parsed here so a malformed payload surfaces as
// the generic internal error instead of an extractor rejection.
pub async fn send_message(State(state): State<AppState>, body: Bytes) -> Response {
    match relay(&state, &body).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "send_message relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Internal Error: {err}") })),
            )
                .into_response()
        }
    }
}

/// Forward one completion request upstream with streaming enabled and hand
/// the byte stream back untouched. Single attempt; an upstream failure
/// carries the provider's status and error body.
async fn relay(state: &AppState, body: &[u8]) -> anyhow::Result<Response> {
    let request: SendMessageRequest = serde_json::from_slice(body)?;

    let model = request
        .model
        .clone()
        .unwrap_or_else(|| state.config.default_model.clone());
    let mut payload = json!({
        "model": model,
        "messages": request.messages,
        "stream": true,
    });
    if !request.file_ids.is_empty() {
        payload["file_ids"] = json!(request.file_ids);
    }

    let mut upstream = state
        .http
        .post(format!("{}/chat/completions", state.config.upstream_url))
        .bearer_auth(&state.config.api_key)
        .json(&payload);
    if let Some(organization) = &state.config.organization {
        upstream = upstream.header("OpenAI-Organization", organization);
    }
    let response = upstream.send().await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "upstream rejected completion request");
        return Ok((
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(json!({
                "error": format!("OpenAI API Error: {} - {}", status.as_u16(), text),
            })),
        )
            .into_response());
    }

    // Pass the stream through unbuffered; the connection stays open for the
    // duration of the completion.
    let streamed = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/event-stream"),
        )
        .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
        .header(header::CONNECTION, HeaderValue::from_static("keep-alive"))
        .body(Body::from_stream(response.bytes_stream()))?;
    Ok(streamed)
}
