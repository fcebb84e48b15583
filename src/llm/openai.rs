//! OpenAI-compatible LLM provider implementation.
//!
//! Works with OpenAI, OpenRouter, vLLM, and any other service implementing
//! the OpenAI chat completions API.

use super::api_key::ApiKeySource;
use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key_source: ApiKeySource,
}

impl OpenAIProvider {
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.openai.com/v1").
    /// * `model` - Model to use (e.g., "gpt-4o-mini").
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
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(|m| m.into()).collect(),
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
        };

        debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending completion request to OpenAI-compatible API"
        );

        let mut req_builder = self.client.post(&url).json(&request);

        if let Some(api_key) = self.api_key_source.get_key().await? {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
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

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e))
        })?;

        Ok(into_completion(chat_response))
    }
}

/// A reply without choices maps to empty content, which the JSON recovery
/// downstream reports as truncated.
fn into_completion(response: ChatResponse) -> CompletionResponse {
    let (content, finish_reason) = match response.choices.into_iter().next() {
        Some(choice) => {
            let finish_reason = match choice.finish_reason.as_deref() {
                Some("length") => FinishReason::MaxTokens,
                Some("stop") | None => FinishReason::Stop,
                Some(_) => FinishReason::Other,
            };
            (choice.message.content.unwrap_or_default(), finish_reason)
        }
        None => {
            warn!("No choices in OpenAI response");
            (String::new(), FinishReason::Stop)
        }
    };

    CompletionResponse {
        content,
        finish_reason,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        }),
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        ChatMessage {
            role,
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
