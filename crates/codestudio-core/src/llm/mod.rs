//! Language-model seam
//!
//! The gateway only sees [`LlmProvider`]; which vendor sits behind it is a
//! configuration detail.

pub mod anthropic;
pub mod prompt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Role;

pub use anthropic::{AnthropicProvider, ProviderConfig};

/// Message in the shape the model receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: Role,
    pub content: String,
}

impl ModelMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Completion request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub messages: Vec<ModelMessage>,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Overrides the provider's default budget
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self {
            system: None,
            messages,
            model: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Raw completion text plus accounting
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub response_time_ms: u64,
}

/// Provider trait - implemented by every model backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;
}

/// Stand-in used when no API key is configured
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse> {
        anyhow::bail!("No language model is configured: set ANTHROPIC_API_KEY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_provider_fails() {
        let provider = UnconfiguredProvider;
        let err = provider
            .complete(LlmRequest::new(vec![ModelMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }
}
