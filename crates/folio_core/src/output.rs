//! Output types from LLM responses.

use serde::{Deserialize, Serialize};

/// Supported output types from LLMs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),
}
