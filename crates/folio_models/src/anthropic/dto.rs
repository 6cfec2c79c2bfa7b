//! Wire types for the Anthropic Messages API.

use serde::{Deserialize, Serialize};

/// A content block within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnthropicContentBlock {
    /// Plain text content
    Text {
        /// The text payload
        text: String,
    },
}

/// A message in Anthropic's conversation format.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder, derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct AnthropicMessage {
    /// "user" or "assistant"
    role: String,
    /// Content blocks
    content: Vec<AnthropicContentBlock>,
}

impl AnthropicMessage {
    /// Builder entry point.
    pub fn builder() -> AnthropicMessageBuilder {
        AnthropicMessageBuilder::default()
    }
}

/// Request body for the Messages API.
#[derive(
    Debug, Clone, PartialEq, Serialize, derive_builder::Builder, derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct AnthropicRequest {
    /// Model identifier
    model: String,
    /// Maximum tokens to generate
    max_tokens: u32,
    /// Conversation messages
    messages: Vec<AnthropicMessage>,
    /// System prompt, sent separately from messages
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Sampling temperature
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl AnthropicRequest {
    /// Builder entry point.
    pub fn builder() -> AnthropicRequestBuilder {
        AnthropicRequestBuilder::default()
    }
}

/// Token usage reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct AnthropicUsage {
    /// Tokens in the prompt
    input_tokens: usize,
    /// Tokens in the completion
    output_tokens: usize,
}

/// A content block in a response.
#[derive(Debug, Clone, PartialEq, Deserialize, derive_getters::Getters)]
pub struct AnthropicResponseContent {
    /// The text payload
    text: String,
}

/// Response body from the Messages API.
#[derive(Debug, Clone, PartialEq, Deserialize, derive_getters::Getters)]
pub struct AnthropicResponse {
    /// Response identifier
    id: String,
    /// Generated content blocks
    content: Vec<AnthropicResponseContent>,
    /// Token usage for the call
    usage: AnthropicUsage,
}
