use anyhow::Context;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Relay configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Provider API key.
    pub api_key: String,
    /// Provider base URL, e.g. `https://api.openai.com/v1`.
    pub upstream_url: String,
    /// Optional organization header value.
    pub organization: Option<String>,
    /// Model used when a request names none.
    pub default_model: String,
    /// Listen address.
    pub bind_addr: String,
}

impl RelayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        let upstream_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();
        let organization = std::env::var("OPENAI_ORGANIZATION")
            .ok()
            .filter(|value| !value.is_empty());
        let default_model =
            std::env::var("CORPCHAT_DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let bind_addr =
            std::env::var("CORPCHAT_RELAY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            api_key,
            upstream_url,
            organization,
            default_model,
            bind_addr,
        })
    }
}
