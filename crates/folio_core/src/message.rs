//! Message types for conversation history.

use crate::{Input, Role};
use serde::{Deserialize, Serialize};

/// A message in a conversation.
///
/// # Examples
///
/// ```
/// use folio_core::{Message, Role, Input};
///
/// let message = Message {
///     role: Role::User,
///     content: vec![Input::Text("Hello!".to_string())],
/// };
///
/// assert_eq!(message.role, Role::User);
/// assert_eq!(message.content.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The content of the message
    pub content: Vec<Input>,
}

impl Message {
    /// Create a new message.
    pub fn new(role: Role, content: Vec<Input>) -> Self {
        Self { role, content }
    }

    /// Convenience constructor for a single-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Input::Text(text.into())])
    }
}
