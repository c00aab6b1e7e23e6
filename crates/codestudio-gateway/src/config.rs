//! Gateway configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use codestudio_core::llm::anthropic::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use codestudio_core::llm::UnconfiguredProvider;
use codestudio_core::{AnthropicProvider, LlmProvider, ProviderConfig};

use crate::{GatewayError, Result, DEFAULT_HOST, DEFAULT_PORT};

/// Environment variables consulted for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["ANTHROPIC_API_KEY", "AI_INTEGRATIONS_ANTHROPIC_API_KEY"];

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Seed the default project with the welcome files
    pub seed_files: bool,

    /// Language-model settings
    pub llm: LlmSettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            seed_files: true,
            llm: LlmSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_llm(mut self, llm: LlmSettings) -> Self {
        self.llm = llm;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| GatewayError::InvalidConfig(format!("{}:{}: {}", self.host, self.port, e)))
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Fill unset language-model settings from the environment
    pub fn with_env(mut self) -> Self {
        self.llm = self.llm.overlay_env(|key| std::env::var(key).ok());
        self
    }
}

/// Language-model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API key; the gateway still starts without one, chat calls then fail
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Override for the API base URL
    pub base_url: Option<String>,

    pub model: String,

    pub max_tokens: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries on rate limiting and timeouts
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

impl LlmSettings {
    /// Apply environment values; explicit settings win over the environment
    /// except for the model, which `CODESTUDIO_MODEL` always overrides
    pub fn overlay_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = API_KEY_VARS.iter().find_map(|key| lookup(*key));
        }
        if self.base_url.is_none() {
            self.base_url = lookup("AI_INTEGRATIONS_ANTHROPIC_BASE_URL");
        }
        if let Some(model) = lookup("CODESTUDIO_MODEL") {
            self.model = model;
        }
        self
    }

    /// Build the provider these settings describe
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("No API key configured; AI chat requests will fail");
            return Ok(Arc::new(UnconfiguredProvider));
        };

        let mut config = ProviderConfig::new(api_key.clone()).with_model(self.model.clone());
        config.max_tokens = self.max_tokens;
        config.timeout_secs = self.timeout_secs;
        config.max_retries = self.max_retries;
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }

        let provider = AnthropicProvider::new(config)
            .map_err(|e| GatewayError::InvalidConfig(format!("{:#}", e)))?;
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, DEFAULT_HOST);
        assert!(config.seed_files);
        assert_eq!(config.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_config_builder() {
        let config = GatewayConfig::new().with_host("0.0.0.0").with_port(8080);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_bad_socket_addr_is_config_error() {
        let config = GatewayConfig::new().with_host("not a host");
        assert!(matches!(
            config.socket_addr(),
            Err(GatewayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_serialization_skips_api_key() {
        let mut config = GatewayConfig::default();
        config.llm.api_key = Some("secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));

        let parsed: GatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.port, parsed.port);
        assert!(parsed.llm.api_key.is_none());
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("AI_INTEGRATIONS_ANTHROPIC_API_KEY", "k2"),
            ("AI_INTEGRATIONS_ANTHROPIC_BASE_URL", "http://proxy"),
            ("CODESTUDIO_MODEL", "custom-model"),
        ]
        .into_iter()
        .collect();

        let settings = LlmSettings::default().overlay_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.api_key.as_deref(), Some("k2"));
        assert_eq!(settings.base_url.as_deref(), Some("http://proxy"));
        assert_eq!(settings.model, "custom-model");
    }

    #[test]
    fn test_blank_key_falls_through_to_next_var() {
        let env: HashMap<&str, &str> = [
            ("ANTHROPIC_API_KEY", ""),
            ("AI_INTEGRATIONS_ANTHROPIC_API_KEY", "k2"),
            ("CODESTUDIO_MODEL", "  "),
        ]
        .into_iter()
        .collect();

        let settings = LlmSettings::default().overlay_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.api_key.as_deref(), Some("k2"));
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_explicit_key_wins() {
        let settings = LlmSettings {
            api_key: Some("explicit".to_string()),
            ..LlmSettings::default()
        }
        .overlay_env(|_| Some("from-env".to_string()));
        assert_eq!(settings.api_key.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_missing_key_builds_unconfigured_provider() {
        let provider = LlmSettings::default().build_provider().unwrap();
        assert_eq!(provider.name(), "unconfigured");
    }
}
