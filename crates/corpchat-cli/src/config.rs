use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const TOKEN_ENV: &str = "CORPCHAT_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token for the store API; `CORPCHAT_TOKEN` takes precedence.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            api_url: default_api_url(),
            token: None,
            model: default_model(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl CliConfig {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("Warning: Failed to parse config: {err}");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("Warning: Failed to read config: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("corpchat")
            .join("config.toml")
    }

    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.token.clone())
    }
}

fn default_relay_url() -> String {
    "http://localhost:3000/api/send_message".to_string()
}

fn default_api_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.idle_timeout_secs, 120);
        assert!(config.token.is_none());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: CliConfig = toml::from_str("model = \"gpt-4\"\n").unwrap();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.relay_url, "http://localhost:3000/api/send_message");
    }
}
