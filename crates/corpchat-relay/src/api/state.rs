use std::sync::Arc;

use reqwest::Client;

use crate::config::RelayConfig;

/// Shared handler state: one outbound HTTP client plus the static config.
/// The relay itself is stateless per request.
#[derive(Clone)]
pub struct AppState {
    pub http: Client,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            http: Client::new(),
            config: Arc::new(config),
        }
    }
}
