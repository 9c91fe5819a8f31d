//! Edit merger
//!
//! Applies a natural-language instruction to a document by asking the text
//! model for a complete replacement, then forcing every protected field
//! back to its pre-edit value.

use crate::cancel::CancelToken;
use crate::error::EditError;
use crate::prompts;
use sitegen_document::{redact_images, Document, DocumentSchema, ProtectedFields};
use sitegen_model::{strip_code_fences, TextModel, TextRequest};
use std::fmt;
use std::sync::Arc;

/// Merges AI edits into documents
pub struct EditMerger {
    text: Arc<dyn TextModel>,
    schema: Arc<DocumentSchema>,
}

impl fmt::Debug for EditMerger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditMerger").finish_non_exhaustive()
    }
}

impl EditMerger {
    /// Create merger
    #[must_use]
    pub fn new(text: Arc<dyn TextModel>, schema: Arc<DocumentSchema>) -> Self {
        Self { text, schema }
    }

    /// Apply `instruction` to `current`, returning the edited document
    ///
    /// `current` is never modified. On success the result carries the
    /// protected fields of `current` byte for byte.
    ///
    /// # Errors
    /// - `EditError::InvalidInput` for a blank instruction (no model call)
    /// - `EditError::ModelInvocation` if the text call fails
    /// - `EditError::ModelOutput` if the response is not a valid document
    /// - `EditError::Cancelled` if `cancel` fires first
    pub async fn apply_edit(
        &self,
        instruction: &str,
        current: &Document,
        cancel: &CancelToken,
    ) -> Result<Document, EditError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(EditError::InvalidInput("instruction is required".to_string()));
        }
        tracing::info!(instruction, "applying AI edit");

        let protected = ProtectedFields::capture(current);
        let prompt = prompts::edit_prompt(&redact_images(current), instruction, protected.contact());
        let request = TextRequest::new(prompt)
            .with_system_instruction(prompts::EDIT_SYSTEM_PROMPT)
            .with_response_schema(self.schema.model_schema().clone());

        let raw = cancel.run(self.text.generate_text(&request)).await??;
        tracing::debug!(bytes = raw.len(), "edit response received");

        let mut value = DocumentSchema::parse_value(&strip_code_fences(&raw))?;
        // contact is restored before schema checks so a mangled block cannot fail the edit
        if let Some(contact) = value.get_mut("contact") {
            *contact = serde_json::to_value(protected.contact())
                .map_err(sitegen_document::DocumentError::from)?;
        }
        let mut edited = self.schema.decode(value)?;
        protected.restore(&mut edited);
        edited.validate_content()?;

        tracing::info!("AI edit applied");
        Ok(edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, embedded_document, FnText};
    use serde_json::{json, Value};
    use sitegen_document::{ImageSlot, PRESERVED_SENTINEL};
    use sitegen_model::ModelError;

    /// Model that returns a transform of the document it was sent
    fn rewriter(
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Arc<FnText<impl Fn(&TextRequest) -> Result<String, ModelError> + Send + Sync>> {
        Arc::new(FnText::new(move |request: &TextRequest| {
            let sent = embedded_document(&request.prompt);
            Ok(format!("```json\n{}\n```", transform(sent)))
        }))
    }

    fn merger(model: Arc<dyn TextModel>) -> EditMerger {
        EditMerger::new(model, Arc::new(DocumentSchema::new().unwrap()))
    }

    #[tokio::test]
    async fn shorter_headline_keeps_hero_image() {
        let model = rewriter(|mut doc| {
            doc["hero"]["headline"] = json!({ "line1": "Yards", "line2": "done", "line3": "right" });
            doc
        });
        let before = fixtures::document();

        let after = merger(model)
            .apply_edit("make the headline shorter", &before, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(after.hero.headline.line1, "Yards");
        assert_eq!(after.hero.hero_image, before.hero.hero_image);
        assert_eq!(after.contact, before.contact);
        assert_eq!(after.services, before.services);
    }

    #[tokio::test]
    async fn outbound_payload_redacts_images() {
        let model = rewriter(|doc| doc);
        merger(model.clone())
            .apply_edit("no-op", &fixtures::document(), &CancelToken::new())
            .await
            .unwrap();

        let request = model.requests.lock()[0].clone();
        assert!(request.prompt.contains(PRESERVED_SENTINEL));
        assert!(!request.prompt.contains("SEVSTw=="));
        assert!(request.prompt.contains("- Phone: 5125550101"));
        assert!(request.system_instruction.is_some());
        assert!(request.response_schema.is_some());
    }

    #[tokio::test]
    async fn tampered_protected_fields_are_restored() {
        let model = rewriter(|mut doc| {
            doc["hero"]["heroImage"] = json!("https://evil.example/x.png");
            doc["aboutUs"]["image"] = json!("");
            doc["contact"] = json!({ "phone": "", "location": "Mars", "companyName": "Other" });
            doc["bannerText"] = json!("New banner");
            doc
        });
        let before = fixtures::document();

        let after = merger(model)
            .apply_edit("change everything", &before, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(after.banner_text, "New banner");
        for slot in ImageSlot::ALL {
            assert_eq!(slot.get(&after), slot.get(&before), "{slot}");
        }
        assert_eq!(after.contact, before.contact);
    }

    #[tokio::test]
    async fn no_op_edit_is_stable() {
        let before = fixtures::document();
        let after = merger(rewriter(|doc| doc))
            .apply_edit("leave it", &before, &CancelToken::new())
            .await
            .unwrap();
        pretty_assertions::assert_eq!(after, before);
    }

    #[tokio::test]
    async fn missing_section_is_named() {
        let model = rewriter(|mut doc| {
            if let Some(map) = doc.as_object_mut() {
                map.remove("faqs");
            }
            doc
        });
        let err = merger(model)
            .apply_edit("drop faqs", &fixtures::document(), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing required field: faqs"), "{err}");
    }

    #[tokio::test]
    async fn cardinality_violation_is_rejected() {
        let model = rewriter(|mut doc| {
            if let Some(cards) = doc["services"]["cards"].as_array_mut() {
                cards.pop();
            }
            doc
        });
        let err = merger(model)
            .apply_edit("three services", &fixtures::document(), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::ModelOutput(_)));
    }

    #[tokio::test]
    async fn blank_instruction_makes_no_call() {
        let model = rewriter(|doc| doc);
        let err = merger(model.clone())
            .apply_edit("   ", &fixtures::document(), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidInput(_)));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn garbage_response_is_model_output() {
        let model = Arc::new(FnText::new(|_: &TextRequest| Ok("I'd rather not.".to_string())));
        let err = merger(model)
            .apply_edit("anything", &fixtures::document(), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::ModelOutput(_)));
        assert!(err.is_retryable());
    }
}
