//! LLM provider trait definition.

use super::types::{CompletionResponse, FinishReason, Message};
use crate::server::metrics::record_llm_request;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: Some(4000),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LlmError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Connection(_) => "connection",
            LlmError::Api { .. } => "api",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::RateLimited => "rate_limited",
            LlmError::Timeout => "timeout",
            LlmError::Serialization(_) => "serialization",
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations connect to different LLM backends (Anthropic,
/// OpenAI-compatible services) while providing a unified interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider's name (e.g., "anthropic", "openai").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Complete a conversation.
    ///
    /// Fails only on transport, authentication or protocol errors; the
    /// content of the reply is never inspected here.
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;
}

/// Sends a single user prompt and returns the reply, recording call metrics.
pub async fn complete_prompt(
    provider: &dyn LlmProvider,
    prompt: &str,
    options: &CompletionOptions,
) -> Result<CompletionResponse, LlmError> {
    let start = Instant::now();
    let result = provider
        .complete(&[Message::user(prompt)], options)
        .await;
    let elapsed = start.elapsed();

    match &result {
        Ok(response) => {
            record_llm_request(provider.name(), "success", elapsed);
            if response.finish_reason == FinishReason::MaxTokens {
                warn!(
                    provider = provider.name(),
                    model = provider.model(),
                    "Completion stopped at the token limit"
                );
            }
            debug!(
                provider = provider.name(),
                response_len = response.content.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Completion received"
            );
        }
        Err(e) => {
            record_llm_request(provider.name(), e.kind(), elapsed);
            warn!(provider = provider.name(), error = %e, "Completion failed");
        }
    }
    result
}
