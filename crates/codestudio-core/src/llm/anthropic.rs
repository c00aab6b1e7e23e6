//! Anthropic Messages API provider

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::{LlmProvider, LlmRequest, LlmResponse};
use crate::types::Role;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
const API_VERSION: &str = "2023-06-01";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Retries on 429 and timeouts
    pub max_retries: u32,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 120,
            max_retries: 2,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        format!("{}/v1/messages", base.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Anthropic Provider (Claude)
pub struct AnthropicProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    headers: HeaderMap,
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&config.api_key).context("API key is not a valid header")?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            config,
            client,
            headers,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, body: &MessagesRequest<'_>) -> Result<MessagesResponse> {
        let url = self.config.endpoint();
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(&url)
                .headers(self.headers.clone())
                .json(body)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    return resp.json().await.context("Failed to parse Anthropic response");
                }
                Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
                    && retries < self.config.max_retries =>
                {
                    retries += 1;
                    let backoff = Duration::from_millis(500 * retries as u64);
                    tracing::warn!("Rate limited by Anthropic, retrying in {:?}", backoff);
                    tokio::time::sleep(backoff).await;
                }
                Ok(resp) => {
                    let status = resp.status();
                    let error_text = resp.text().await.unwrap_or_default();
                    return Err(anyhow!("Anthropic API error ({}): {}", status, error_text));
                }
                Err(e) if e.is_timeout() && retries < self.config.max_retries => {
                    retries += 1;
                    tracing::warn!("Anthropic request timed out, retry {}", retries);
                }
                Err(e) => return Err(anyhow!("Anthropic request failed: {}", e)),
            }
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let start = Instant::now();
        let model = request.model.as_deref().unwrap_or(&self.config.model);

        let body = MessagesRequest {
            model,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            system: request.system.as_deref(),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
        };

        let response = self.send(&body).await?;

        // No text block means nothing usable; "{}" normalizes to an empty answer
        let content = response
            .content
            .iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text.clone())
            .unwrap_or_else(|| "{}".to_string());

        let usage = response.usage.unwrap_or(Usage {
            input_tokens: 0,
            output_tokens: 0,
        });

        Ok(LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| model.to_string()),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
