//! Google Gemini provider integration (feature `gemini`).

mod client;

pub use client::GeminiClient;
