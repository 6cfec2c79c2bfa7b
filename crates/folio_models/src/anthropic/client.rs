use crate::anthropic::dto::{
    AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse,
};
use async_trait::async_trait;
use folio_core::{GenerateRequest, GenerateResponse, Input, Output, Role, TokenUsage};
use folio_error::{FolioError, FolioResult, ModelsError, ModelsErrorKind};
use folio_interface::FolioDriver;
use reqwest::Client;
use tracing::{debug, error, instrument};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic API client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key
    /// * `model` - Model identifier (e.g., "claude-3-5-sonnet-20241022")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let model = model.into();
        debug!("Creating new Anthropic client");
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    /// Creates a client from `ANTHROPIC_API_KEY` and optional `ANTHROPIC_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key is not set.
    pub fn from_env() -> FolioResult<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            FolioError::from(ModelsError::new(ModelsErrorKind::Configuration(
                "ANTHROPIC_API_KEY not set".to_string(),
            )))
        })?;
        let model = std::env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string());
        Ok(Self::new(api_key, model))
    }

    /// Sends a request to the Anthropic API.
    #[instrument(skip(self, request), fields(model = %request.model()))]
    pub async fn generate_anthropic(
        &self,
        request: &AnthropicRequest,
    ) -> Result<AnthropicResponse, ModelsError> {
        debug!("Sending request to Anthropic API");

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to Anthropic API");
                ModelsError::new(ModelsErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Anthropic API returned error");
            return Err(ModelsError::new(ModelsErrorKind::ApiError {
                status: status.as_u16(),
                message: body,
            }));
        }

        let anthropic_response: AnthropicResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse Anthropic response");
            ModelsError::new(ModelsErrorKind::Parse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        debug!(response_id = %anthropic_response.id(), "Received response from Anthropic");
        Ok(anthropic_response)
    }

    /// Converts a Folio GenerateRequest to an Anthropic API request.
    #[instrument(skip(request))]
    fn convert_request(&self, request: &GenerateRequest) -> Result<AnthropicRequest, ModelsError> {
        debug!("Converting GenerateRequest to AnthropicRequest");

        let mut system: Option<String> = None;
        let mut messages = Vec::new();

        for msg in &request.messages {
            let text: Vec<&str> = msg
                .content
                .iter()
                .map(|input| match input {
                    Input::Text(text) => text.as_str(),
                })
                .collect();
            let text = text.join("\n");

            if text.is_empty() {
                return Err(ModelsError::new(ModelsErrorKind::ConversionError(
                    "Message must have at least one text content block".to_string(),
                )));
            }

            // Anthropic takes the system prompt as a separate parameter
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => {
                    system = Some(text);
                    continue;
                }
            };

            let message = AnthropicMessage::builder()
                .role(role)
                .content(vec![AnthropicContentBlock::Text { text }])
                .build()
                .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))?;
            messages.push(message);
        }

        let mut builder = AnthropicRequest::builder();
        builder
            .model(request.model.clone().unwrap_or_else(|| self.model.clone()))
            .max_tokens(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS))
            .messages(messages);

        if let Some(system) = system {
            builder.system(Some(system));
        }
        if let Some(temp) = request.temperature {
            builder.temperature(Some(temp));
        }

        builder
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))
    }

    /// Converts an Anthropic API response to a Folio GenerateResponse.
    fn convert_response(response: &AnthropicResponse) -> GenerateResponse {
        let outputs: Vec<Output> = response
            .content()
            .iter()
            .map(|content| Output::Text(content.text().clone()))
            .collect();

        let usage = TokenUsage::new(
            *response.usage().input_tokens(),
            *response.usage().output_tokens(),
        );

        GenerateResponse {
            outputs,
            usage: Some(usage),
        }
    }
}

#[async_trait]
impl FolioDriver for AnthropicClient {
    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request))]
    async fn generate(&self, request: &GenerateRequest) -> FolioResult<GenerateResponse> {
        debug!("Generating response with Anthropic");

        let anthropic_request = self.convert_request(request)?;
        let anthropic_response = self.generate_anthropic(&anthropic_request).await?;

        Ok(Self::convert_response(&anthropic_response))
    }
}
