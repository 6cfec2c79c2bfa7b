//! Input types for LLM requests.

use serde::{Deserialize, Serialize};

/// Supported input types to LLMs.
///
/// The generation pipeline is text-only today; the enum form keeps the wire
/// shape stable if richer inputs are added.
///
/// # Examples
///
/// ```
/// use folio_core::Input;
///
/// let text = Input::Text("Summarize remote work trends.".to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    /// Plain text input.
    Text(String),
}
