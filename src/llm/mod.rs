//! LLM provider abstraction layer.
//!
//! This module provides a trait-based abstraction for LLM providers,
//! allowing the analyzers and the script synthesizer to work with
//! different backends (Anthropic, OpenAI-compatible, test stubs).

mod anthropic;
mod api_key;
mod openai;
mod provider;
mod types;

pub use anthropic::AnthropicProvider;
pub use api_key::ApiKeySource;
pub use openai::OpenAIProvider;
pub use provider::{complete_prompt, CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};

use crate::config::{LlmProviderKind, LlmSettings};
use std::sync::Arc;

/// Builds the provider selected by the configuration.
pub fn provider_from_settings(settings: &LlmSettings) -> Arc<dyn LlmProvider> {
    let key_source = ApiKeySource::from_settings(
        settings.api_key.clone(),
        settings.api_key_command.clone(),
    );
    match settings.provider {
        LlmProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
            &settings.base_url,
            &settings.model,
            key_source,
        )),
        LlmProviderKind::OpenAi => Arc::new(OpenAIProvider::new(
            &settings.base_url,
            &settings.model,
            key_source,
        )),
    }
}

/// Completion options derived from the configured budget.
pub fn options_from_settings(settings: &LlmSettings) -> CompletionOptions {
    CompletionOptions {
        temperature: settings.temperature,
        max_tokens: Some(settings.max_tokens),
        timeout: settings.timeout(),
    }
}
