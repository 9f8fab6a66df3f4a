pub mod send_message;
pub mod state;

pub use state::AppState;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/send_message", post(send_message::send_message))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "corpchat relay is working!" }))
}
