//! Request and response types for LLM generation.

use crate::{Message, Output, TokenUsage};
use serde::{Deserialize, Serialize};

/// Generic generation request.
///
/// # Examples
///
/// ```
/// use folio_core::{GenerateRequest, Message, Role, Input};
///
/// let request = GenerateRequest {
///     messages: vec![Message {
///         role: Role::User,
///         content: vec![Input::Text("Hello!".to_string())],
///     }],
///     max_tokens: Some(100),
///     temperature: Some(0.7),
///     model: None,
/// };
///
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.max_tokens, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder)]
#[builder(default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Model identifier to use; `None` selects the driver's default
    pub model: Option<String>,
}

impl GenerateRequest {
    /// Create a request from messages with driver defaults for everything else.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Builder entry point.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// The unified response object.
///
/// # Examples
///
/// ```
/// use folio_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![Output::Text("Hello! How can I help?".to_string())],
///     usage: None,
/// };
///
/// assert_eq!(response.outputs.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
    /// Token usage reported by the provider, when available
    pub usage: Option<TokenUsage>,
}

impl GenerateResponse {
    /// Concatenated text content of all outputs.
    pub fn text(&self) -> String {
        let texts: Vec<&str> = self
            .outputs
            .iter()
            .map(|output| match output {
                Output::Text(text) => text.as_str(),
            })
            .collect();
        texts.join("\n")
    }
}
