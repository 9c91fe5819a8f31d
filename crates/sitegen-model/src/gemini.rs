//! Gemini REST client
//!
//! Implements [`TextModel`] and [`ImageModel`] over the
//! `models/{model}:generateContent` endpoint.

use crate::client::{ImageModel, ImageOutput, InlineImage, TextModel, TextRequest};
use crate::config::ModelConfig;
use crate::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

mod wire {
    use super::{Deserialize, Serialize, Value};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Part {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub(super) text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub(super) inline_data: Option<InlineData>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct InlineData {
        #[serde(default)]
        pub(super) mime_type: String,
        pub(super) data: String,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub(super) struct Content {
        #[serde(default)]
        pub(super) parts: Vec<Part>,
    }

    impl Content {
        pub(super) fn text(text: &str) -> Self {
            Self {
                parts: vec![Part {
                    text: Some(text.to_string()),
                    inline_data: None,
                }],
            }
        }
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct GenerationConfig {
        pub(super) response_mime_type: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub(super) response_schema: Option<Value>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct GenerateContentRequest {
        pub(super) contents: Vec<Content>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub(super) system_instruction: Option<Content>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub(super) generation_config: Option<GenerationConfig>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub(super) struct Candidate {
        #[serde(default)]
        pub(super) content: Option<Content>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub(super) struct GenerateContentResponse {
        #[serde(default)]
        pub(super) candidates: Vec<Candidate>,
    }

    impl GenerateContentResponse {
        pub(super) fn parts(&self) -> &[Part] {
            self.candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|c| c.parts.as_slice())
                .unwrap_or(&[])
        }
    }
}

use wire::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// HTTP client for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl GeminiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    /// `ModelError::Transport` if the HTTP client cannot be built
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ModelError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ModelError::MissingCredential)?;

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            tracing::warn!(model, status = status.as_u16(), "model call failed: {}", message);
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ModelError::ModelNotFound(message));
            }
            return Err(ModelError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| self.map_transport(e))
    }

    fn map_transport(&self, err: reqwest::Error) -> ModelError {
        match (err.is_timeout(), self.config.request_timeout_secs) {
            (true, Some(duration_secs)) => ModelError::Timeout { duration_secs },
            _ => ModelError::from(err),
        }
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ModelError> {
        let body = GenerateContentRequest {
            contents: vec![Content::text(&request.prompt)],
            system_instruction: request.system_instruction.as_deref().map(Content::text),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.response_schema.clone(),
            }),
        };

        let model = self.config.text_model.as_str();
        let response = self
            .config
            .text_retry
            .run(|| self.generate_content(model, &body))
            .await?;

        let text: String = response
            .parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        tracing::debug!(model, bytes = text.len(), "text model responded");
        Ok(text)
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> Result<ImageOutput, ModelError> {
        let body = GenerateContentRequest {
            contents: vec![Content::text(prompt)],
            system_instruction: None,
            generation_config: None,
        };

        let response = self
            .generate_content(&self.config.image_model, &body)
            .await?;

        // the model may be chatty; take the first inline image in any part
        let parts = response.parts();
        if let Some(data) = parts.iter().find_map(|p| p.inline_data.as_ref()) {
            return Ok(ImageOutput::Image(InlineImage {
                mime_type: data.mime_type.clone(),
                data: data.data.clone(),
            }));
        }

        let text = parts
            .iter()
            .find_map(|p| p.text.clone())
            .unwrap_or_else(|| "Unknown Error".to_string());
        Ok(ImageOutput::Refusal(text))
    }
}
