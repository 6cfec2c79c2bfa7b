//! Google Gemini API implementation.
//!
//! A thin adapter over the `gemini-rust` SDK. Useful as the research/outline
//! driver when cost matters more than prose quality; the writing stages
//! usually stay on Anthropic.

use async_trait::async_trait;
use std::env;
use tracing::{debug, instrument};

use gemini_rust::Gemini;

use folio_core::{GenerateRequest, GenerateResponse, Input, Output, Role};
use folio_error::{FolioError, FolioResult, ModelsError, ModelsErrorKind};
use folio_interface::FolioDriver;

const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

/// Google Gemini API client.
pub struct GeminiClient {
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client from `GEMINI_API_KEY` with the default model.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key is not set.
    pub fn new() -> FolioResult<Self> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            FolioError::from(ModelsError::new(ModelsErrorKind::Configuration(
                "GEMINI_API_KEY not set".to_string(),
            )))
        })?;
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Creates a client with an explicit key and model.
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl FolioDriver for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request))]
    async fn generate(&self, request: &GenerateRequest) -> FolioResult<GenerateResponse> {
        debug!("Generating response with Gemini");

        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let client = Gemini::with_model(self.api_key.clone(), model).map_err(|e| {
            FolioError::from(ModelsError::new(ModelsErrorKind::Configuration(
                e.to_string(),
            )))
        })?;

        let mut builder = client.generate_content();
        let mut system_prompt = None;

        for msg in &request.messages {
            let text: Vec<&str> = msg
                .content
                .iter()
                .map(|input| match input {
                    Input::Text(text) => text.as_str(),
                })
                .collect();
            let text = text.join("\n");

            match msg.role {
                // Gemini takes the system prompt separately
                Role::System => system_prompt = Some(text),
                Role::User => builder = builder.with_user_message(&text),
                Role::Assistant => builder = builder.with_model_message(&text),
            }
        }

        if let Some(prompt) = system_prompt {
            builder = builder.with_system_prompt(&prompt);
        }
        if let Some(temp) = request.temperature {
            builder = builder.with_temperature(temp);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.with_max_output_tokens(max_tokens as i32);
        }

        let response = builder.execute().await.map_err(|e| {
            FolioError::from(ModelsError::new(ModelsErrorKind::ApiError {
                status: 0,
                message: e.to_string(),
            }))
        })?;

        Ok(GenerateResponse {
            outputs: vec![Output::Text(response.text())],
            usage: None,
        })
    }
}
