//! Model capabilities
//!
//! The generator and merger depend only on these traits; the Gemini REST
//! client is one implementation and test fakes are another.

use crate::error::ModelError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// A JSON-producing text generation request
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    /// User prompt
    pub prompt: String,
    /// Optional system instruction
    pub system_instruction: Option<String>,
    /// Response schema in the model dialect
    pub response_schema: Option<Value>,
}

impl TextRequest {
    /// Create request from a prompt
    #[inline]
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            response_schema: None,
        }
    }

    /// With system instruction
    #[inline]
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// With response schema
    #[inline]
    #[must_use]
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Inline image bytes returned by an image model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

impl InlineImage {
    /// Render as a `data:` URI after checking the payload decodes
    ///
    /// # Errors
    /// `ModelError::InvalidImageData` if the payload is empty or not base64
    pub fn to_data_uri(&self) -> Result<String, ModelError> {
        if self.data.is_empty() {
            return Err(ModelError::InvalidImageData("empty payload".to_string()));
        }
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| ModelError::InvalidImageData(e.to_string()))?;
        let mime = if self.mime_type.is_empty() {
            "image/png"
        } else {
            self.mime_type.as_str()
        };
        Ok(format!("data:{mime};base64,{}", self.data))
    }
}

/// Outcome of an image generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutput {
    /// The model produced an image
    Image(InlineImage),
    /// The model answered with text only (safety refusal or chatter)
    Refusal(String),
}

/// Text generation capability
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate text (expected to be JSON, possibly fenced) for a request
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ModelError>;
}

/// Image generation capability
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Generate one image for a descriptive prompt
    async fn generate_image(&self, prompt: &str) -> Result<ImageOutput, ModelError>;
}
