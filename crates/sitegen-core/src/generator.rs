//! Content generator
//!
//! Turns [`GeneratorInputs`] into a complete [`Document`]:
//! 1. validate inputs and notify the lead sink (fire-and-forget)
//! 2. one schema-constrained text call for the copy
//! 3. four concurrent image calls, one per [`ImageSlot`]
//! 4. contact block overwritten from the inputs, full validation
//!
//! Image failures never fail generation. Each slot retries once with a
//! sanitized prompt and falls back to a placeholder URL.

use crate::cancel::CancelToken;
use crate::collaborators::{LeadSink, NoopLeadSink};
use crate::error::GenerationError;
use crate::prompts;
use futures::future::join_all;
use serde_json::Value;
use sitegen_document::{Document, DocumentError, DocumentSchema, GeneratorInputs, ImageSlot};
use sitegen_model::{strip_code_fences, ImageModel, ImageOutput, ModelError, TextModel, TextRequest};
use std::fmt;
use std::sync::Arc;

/// Default placeholder image service
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://placehold.co/1200x800";

/// Longest error excerpt embedded in a placeholder URL
const PLACEHOLDER_TEXT_LIMIT: usize = 60;

/// Why a single image slot produced no image
#[derive(Debug, thiserror::Error)]
enum SlotFailure {
    #[error("Error: {0}")]
    Model(#[from] ModelError),
    #[error("{0}")]
    Refused(String),
}

/// Build the deterministic placeholder URL for a failed slot
#[must_use]
pub fn placeholder_url(base: &str, error_text: &str) -> String {
    let excerpt: String = error_text.chars().take(PLACEHOLDER_TEXT_LIMIT).collect();
    reqwest::Url::parse_with_params(base, &[("text", excerpt.as_str())])
        .map_or_else(|_| base.to_string(), String::from)
}

/// Generates complete site documents
pub struct ContentGenerator {
    text: Arc<dyn TextModel>,
    images: Arc<dyn ImageModel>,
    lead: Arc<dyn LeadSink>,
    schema: Arc<DocumentSchema>,
    placeholder_base: String,
}

impl fmt::Debug for ContentGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentGenerator")
            .field("placeholder_base", &self.placeholder_base)
            .finish_non_exhaustive()
    }
}

impl ContentGenerator {
    /// Create generator; lead capture is off until [`Self::with_lead_sink`]
    #[must_use]
    pub fn new(
        text: Arc<dyn TextModel>,
        images: Arc<dyn ImageModel>,
        schema: Arc<DocumentSchema>,
    ) -> Self {
        Self {
            text,
            images,
            lead: Arc::new(NoopLeadSink),
            schema,
            placeholder_base: DEFAULT_PLACEHOLDER_BASE.to_string(),
        }
    }

    /// With lead sink
    #[inline]
    #[must_use]
    pub fn with_lead_sink(mut self, lead: Arc<dyn LeadSink>) -> Self {
        self.lead = lead;
        self
    }

    /// With placeholder base URL
    #[inline]
    #[must_use]
    pub fn with_placeholder_base(mut self, base: impl Into<String>) -> Self {
        self.placeholder_base = base.into();
        self
    }

    /// Generate a complete document
    ///
    /// # Errors
    /// - `GenerationError::InvalidInput` for blank inputs (no model call)
    /// - `GenerationError::ModelInvocation` if the text call fails
    /// - `GenerationError::ModelOutput` if the copy is not a valid document
    /// - `GenerationError::Cancelled` if `cancel` fires first
    pub async fn generate(
        &self,
        inputs: &GeneratorInputs,
        cancel: &CancelToken,
    ) -> Result<Document, GenerationError> {
        inputs.validate()?;
        tracing::info!(
            industry = %inputs.industry,
            company = %inputs.company_name,
            "generating site"
        );
        self.notify_lead(inputs);

        let request = TextRequest::new(prompts::generation_prompt(inputs))
            .with_response_schema(self.schema.model_schema().clone());
        let raw = cancel.run(self.text.generate_text(&request)).await??;
        tracing::debug!(bytes = raw.len(), "copy received");

        let mut value: Value =
            serde_json::from_str(&strip_code_fences(&raw)).map_err(DocumentError::from)?;
        // the model's contact block is discarded before any schema check
        if let Some(map) = value.as_object_mut() {
            let contact = serde_json::to_value(inputs.contact()).map_err(DocumentError::from)?;
            map.insert("contact".to_string(), contact);
        }
        DocumentSchema::check_required(&value)?;
        let mut document = self.schema.decode(value)?;

        let images = cancel.run(self.render_images(inputs)).await?;
        for (slot, uri) in images {
            *slot.get_mut(&mut document) = uri;
        }

        document.validate()?;
        tracing::info!(company = %inputs.company_name, "site generated");
        Ok(document)
    }

    fn notify_lead(&self, inputs: &GeneratorInputs) {
        let lead = Arc::clone(&self.lead);
        let inputs = inputs.clone();
        tokio::spawn(async move {
            if let Err(e) = lead.capture(&inputs).await {
                tracing::warn!(company = %inputs.company_name, "{}", e);
            }
        });
    }

    async fn render_images(&self, inputs: &GeneratorInputs) -> Vec<(ImageSlot, String)> {
        join_all(
            ImageSlot::ALL.map(|slot| async move { (slot, self.render_slot(slot, inputs).await) }),
        )
        .await
    }

    async fn render_slot(&self, slot: ImageSlot, inputs: &GeneratorInputs) -> String {
        let prompt = prompts::image_prompt(slot, inputs);
        match self.try_image(&prompt).await {
            Ok(uri) => return uri,
            Err(e) => tracing::warn!(%slot, "image failed, retrying with safe prompt: {}", e),
        }

        let safe = prompts::sanitize_image_prompt(&prompt);
        match self.try_image(&safe).await {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!(%slot, "safe retry failed, using placeholder: {}", e);
                placeholder_url(&self.placeholder_base, &e.to_string())
            }
        }
    }

    async fn try_image(&self, prompt: &str) -> Result<String, SlotFailure> {
        match self.images.generate_image(prompt).await? {
            ImageOutput::Image(image) => Ok(image.to_data_uri()?),
            ImageOutput::Refusal(text) => Err(SlotFailure::Refused(text)),
        }
    }
}
