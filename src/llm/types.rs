//! Common types for LLM interactions.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Response from an LLM completion request.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The assistant's reply text.
    pub content: String,
    /// Why the completion finished.
    pub finish_reason: FinishReason,
    /// Token usage information (if available).
    pub usage: Option<TokenUsage>,
}

/// Why an LLM completion finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural end of response.
    Stop,
    /// Hit the maximum token limit; the text is likely cut mid-object.
    MaxTokens,
    /// Provider reported something else.
    Other,
}

/// Token usage information.
#[derive(Debug, Clone, Copy)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let sys = Message::system("You are a radio DJ");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content, "You are a radio DJ");

        assert_eq!(Message::user("Hello").role, MessageRole::User);
        assert_eq!(Message::assistant("Hi there").role, MessageRole::Assistant);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::user("x")).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
