//! Trait definitions for LLM backends.

use async_trait::async_trait;
use folio_core::{GenerateRequest, GenerateResponse};
use folio_error::FolioResult;

/// Core trait that all LLM backends must implement.
///
/// This provides the minimal interface for text generation. Stages receive a
/// driver by injection so they can be exercised with fakes in tests.
#[async_trait]
pub trait FolioDriver: Send + Sync {
    /// Generate model output given a request.
    async fn generate(&self, req: &GenerateRequest) -> FolioResult<GenerateResponse>;

    /// Provider name (e.g., "anthropic", "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "claude-3-5-sonnet-20241022").
    fn model_name(&self) -> &str;
}
