//! Anthropic (Claude) provider integration.

mod client;
mod dto;

pub use client::AnthropicClient;
pub use dto::{
    AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse,
    AnthropicResponseContent, AnthropicUsage,
};
