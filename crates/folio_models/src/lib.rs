//! LLM provider integrations for Folio.
//!
//! This crate provides client implementations of [`folio_interface::FolioDriver`]
//! for the providers the pipeline speaks to.
//!
//! # Available Providers
//!
//! - **Anthropic** (Claude) - always available, used for writing-heavy stages
//! - **Gemini** (Google) - enable with the `gemini` feature
//!
//! # Example
//!
//! ```no_run
//! use folio_models::AnthropicClient;
//! use folio_interface::FolioDriver;
//! use folio_core::{GenerateRequest, Message};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AnthropicClient::from_env()?;
//! let request = GenerateRequest::new(vec![Message::user("Hello")]);
//! let response = client.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod anthropic;

#[cfg(feature = "gemini")]
mod gemini;

pub use anthropic::{AnthropicClient, AnthropicRequest, AnthropicResponse};

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
