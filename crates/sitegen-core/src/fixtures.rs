//! Unit-test fixtures and model fakes

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use sitegen_document::{Document, GeneratorInputs};
use sitegen_model::{ImageModel, ImageOutput, InlineImage, ModelError, TextModel, TextRequest};
use std::collections::VecDeque;

pub(crate) const PNG_URI: &str = "data:image/png;base64,aGVsbG8=";

pub(crate) fn inputs() -> GeneratorInputs {
    GeneratorInputs::new("landscaping", "GreenPath", "Austin, TX", "5125550101")
}

/// Copy as the text model returns it: no images, contact not trusted
pub(crate) fn copy_json() -> Value {
    let card = json!({ "title": "Lawn care", "description": "Mowing and edging", "icon": "leaf" });
    let faq = json!({ "question": "How do I start?", "answer": "Call 5125550101." });
    json!({
        "bannerText": "Serving Austin, TX",
        "hero": {
            "badge": "Local",
            "headline": { "line1": "Yards done", "line2": "right, every", "line3": "single week" },
            "subtext": "GreenPath keeps lawns tidy."
        },
        "services": { "cards": [card, card, card, card] },
        "repairBenefits": { "title": "Why repair", "items": [card, card, card] },
        "aboutUs": { "title": "About GreenPath", "content": "Local crew." },
        "whyItMatters": { "title": "Why it matters", "content": "Healthy lawns." },
        "additionalBenefits": { "cards": [card, card, card] },
        "industryValue": { "title": "Value", "content": "Care pays off." },
        "benefits": { "items": ["Reliable", "Local", "Honest"] },
        "faqs": [faq, faq, faq, faq],
        "contact": { "phone": "0000000000", "location": "Nowhere", "companyName": "Other" }
    })
}

/// Complete document with images and the fixture contact
pub(crate) fn document() -> Document {
    let mut value = copy_json();
    value["hero"]["heroImage"] = json!("data:image/png;base64,SEVSTw==");
    value["repairBenefits"]["image"] = json!("data:image/png;base64,UkVQ");
    value["aboutUs"]["image"] = json!("https://placehold.co/1200x800?text=x");
    value["industryValue"]["valueImage"] = json!("data:image/png;base64,VkFM");
    value["contact"] = json!({ "phone": "5125550101", "location": "Austin, TX", "companyName": "GreenPath" });
    serde_json::from_value(value).unwrap()
}

pub(crate) fn png() -> ImageOutput {
    ImageOutput::Image(InlineImage {
        mime_type: "image/png".into(),
        data: "aGVsbG8=".into(),
    })
}

/// Pull the JSON document embedded in an edit prompt
pub(crate) fn embedded_document(prompt: &str) -> Value {
    let start = prompt.find('{').unwrap_or(0);
    let end = prompt.rfind('}').map_or(prompt.len(), |i| i + 1);
    serde_json::from_str(&prompt[start..end]).unwrap_or(Value::Null)
}

/// Text model answering through a closure, recording every request
pub(crate) struct FnText<F> {
    respond: F,
    pub(crate) requests: Mutex<Vec<TextRequest>>,
}

impl<F> FnText<F>
where
    F: Fn(&TextRequest) -> Result<String, ModelError> + Send + Sync,
{
    pub(crate) fn new(respond: F) -> Self {
        Self {
            respond,
            requests: Mutex::default(),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl<F> TextModel for FnText<F>
where
    F: Fn(&TextRequest) -> Result<String, ModelError> + Send + Sync,
{
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ModelError> {
        self.requests.lock().push(request.clone());
        (self.respond)(request)
    }
}

/// Text model that always returns the fixture copy
pub(crate) fn copy_model() -> FnText<impl Fn(&TextRequest) -> Result<String, ModelError>> {
    FnText::new(|_: &TextRequest| Ok(format!("```json\n{}\n```", copy_json())))
}

/// Image model popping scripted answers, then succeeding
#[derive(Default)]
pub(crate) struct ScriptedImages {
    script: Mutex<VecDeque<Result<ImageOutput, ModelError>>>,
    pub(crate) prompts: Mutex<Vec<String>>,
}

impl ScriptedImages {
    pub(crate) fn new(script: Vec<Result<ImageOutput, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::default(),
        }
    }
}

#[async_trait]
impl ImageModel for ScriptedImages {
    async fn generate_image(&self, prompt: &str) -> Result<ImageOutput, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        self.script.lock().pop_front().unwrap_or_else(|| Ok(png()))
    }
}
