//! Anthropic Messages API provider.

use super::api_key::ApiKeySource;
use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = "IntroFuse/1.0";
/// The Messages API requires an explicit budget.
const DEFAULT_MAX_TOKENS: u32 = 4000;

pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key_source: ApiKeySource,
}

impl AnthropicProvider {
    /// # Arguments
    /// * `base_url` - API root without the version path (e.g., "https://api.anthropic.com").
    /// * `model` - Model to use (e.g., "claude-3-5-sonnet-20241022").
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_source: ApiKeySource,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key_source,
        }
    }

    fn build_request(&self, messages: &[Message], options: &CompletionOptions) -> MessagesRequest {
        let system = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        MessagesRequest {
            model: self.model.clone(),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: options.temperature,
            system: (!system.is_empty()).then_some(system),
            messages: messages
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .map(|m| AnthropicMessage {
                    role: match m.role {
                        MessageRole::Assistant => "assistant",
                        _ => "user",
                    },
                    content: m.content.clone(),
                })
                .collect(),
        }
    }
}

/// A reply without text blocks maps to empty content, which the JSON
/// recovery downstream reports as truncated.
fn into_completion(response: MessagesResponse) -> CompletionResponse {
    let content = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    if content.is_empty() {
        warn!("No text content in Anthropic response");
    }

    let finish_reason = match response.stop_reason.as_deref() {
        Some("end_turn") | Some("stop_sequence") | None => FinishReason::Stop,
        Some("max_tokens") => FinishReason::MaxTokens,
        Some(_) => FinishReason::Other,
    };

    CompletionResponse {
        content,
        finish_reason,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
        }),
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = self.build_request(messages, options);

        debug!(
            model = %self.model,
            message_count = request.messages.len(),
            max_tokens = request.max_tokens,
            "Sending completion request to Anthropic"
        );

        let mut req_builder = self
            .client
            .post(&url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("User-Agent", USER_AGENT)
            .json(&request);

        if let Some(api_key) = self.api_key_source.get_key().await? {
            req_builder = req_builder.header("x-api-key", api_key);
        }

        let response = req_builder
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: MessagesResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse Anthropic response: {}", e))
        })?;

        Ok(into_completion(body))
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
