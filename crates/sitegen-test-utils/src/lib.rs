//! Testing utilities for Sitegen workspace
//!
//! Shared fixtures, scripted model fakes and an instrumented store.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use sitegen_core::{MemoryStore, SiteStore, StoreError};
use sitegen_document::{Document, GeneratorInputs, SiteId, SiteInstance};
use sitegen_model::{ImageModel, ImageOutput, InlineImage, ModelError, TextModel, TextRequest};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub const SAMPLE_PNG_DATA: &str = "aGVsbG8=";
pub const SAMPLE_PNG_URI: &str = "data:image/png;base64,aGVsbG8=";

pub fn sample_inputs() -> GeneratorInputs {
    GeneratorInputs::new("landscaping", "GreenPath", "Austin, TX", "5125550101")
}

/// Copy as a text model returns it: no images and an untrusted contact
pub fn model_copy_json() -> Value {
    let card = |title: &str| json!({ "title": title, "description": format!("{title} done well"), "icon": "leaf" });
    let faq = |q: &str| json!({ "question": q, "answer": "Call us today." });
    json!({
        "bannerText": "Serving Austin, TX since 2009",
        "hero": {
            "badge": "Locally owned",
            "headline": { "line1": "Beautiful yards", "line2": "without the", "line3": "weekend work" },
            "subtext": "GreenPath handles mowing, edging and seasonal cleanup."
        },
        "services": { "cards": [card("Mowing"), card("Edging"), card("Mulching"), card("Cleanup")] },
        "repairBenefits": { "title": "Why fix it now", "items": [card("Curb appeal"), card("Healthy soil"), card("Less work")] },
        "aboutUs": { "title": "About GreenPath", "content": "A local crew that shows up on time." },
        "whyItMatters": { "title": "Why it matters", "content": "A tidy yard protects your investment." },
        "additionalBenefits": { "cards": [card("Insured"), card("Guaranteed"), card("Flexible")] },
        "industryValue": { "title": "Worth every visit", "content": "Regular care costs less than repair." },
        "benefits": { "items": ["Reliable", "Local", "Honest pricing"] },
        "faqs": [faq("Do you offer contracts?"), faq("Are you insured?"), faq("What areas?"), faq("How do I pay?")],
        "contact": { "phone": "0000000000", "location": "Nowhere", "companyName": "Someone Else" }
    })
}

/// Fence a JSON value the way models tend to answer
pub fn fenced(value: &Value) -> String {
    format!("```json\n{value}\n```")
}

/// Complete, valid document matching [`sample_inputs`]
pub fn sample_document() -> Document {
    let mut value = model_copy_json();
    value["hero"]["heroImage"] = json!("data:image/png;base64,SEVSTw==");
    value["repairBenefits"]["image"] = json!("data:image/png;base64,UkVQ");
    value["aboutUs"]["image"] = json!("https://placehold.co/1200x800?text=offline");
    value["industryValue"]["valueImage"] = json!("data:image/png;base64,VkFM");
    value["contact"] = json!({ "phone": "5125550101", "location": "Austin, TX", "companyName": "GreenPath" });
    serde_json::from_value(value).unwrap()
}

/// JSON document embedded in an edit prompt, `Null` if none
pub fn embedded_document(prompt: &str) -> Value {
    let (Some(start), Some(end)) = (prompt.find('{'), prompt.rfind('}')) else {
        return Value::Null;
    };
    serde_json::from_str(&prompt[start..=end]).unwrap_or(Value::Null)
}

type Responder = Box<dyn Fn(&TextRequest) -> Result<String, ModelError> + Send + Sync>;

/// Text model answering through a closure and recording every request
pub struct ScriptedTextModel {
    respond: Responder,
    requests: Mutex<Vec<TextRequest>>,
}

impl ScriptedTextModel {
    pub fn new(
        respond: impl Fn(&TextRequest) -> Result<String, ModelError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            requests: Mutex::default(),
        }
    }

    /// Always answer with the sample copy
    pub fn copy() -> Self {
        Self::new(|_| Ok(fenced(&model_copy_json())))
    }

    /// Answer every request with the same text
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Answer edit requests with a transform of the document they carry
    pub fn rewriting(transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self::new(move |request| Ok(fenced(&transform(embedded_document(&request.prompt)))))
    }

    /// Answer generation requests with the sample copy and edit requests
    /// through `transform`
    pub fn generating_then_rewriting(
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |request| {
            if request.system_instruction.is_none() {
                Ok(fenced(&model_copy_json()))
            } else {
                Ok(fenced(&transform(embedded_document(&request.prompt))))
            }
        })
    }

    pub fn requests(&self) -> Vec<TextRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl TextModel for ScriptedTextModel {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ModelError> {
        self.requests.lock().push(request.clone());
        (self.respond)(request)
    }
}

/// Text model that blocks each call until the test releases it
pub struct GatedTextModel {
    inner: Arc<dyn TextModel>,
    gate: Semaphore,
    entered: Semaphore,
}

impl GatedTextModel {
    pub fn new(inner: Arc<dyn TextModel>) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
            entered: Semaphore::new(0),
        }
    }

    /// Let one pending call through
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Wait until a call is blocked at the gate
    pub async fn wait_entered(&self) {
        if let Ok(permit) = self.entered.acquire().await {
            permit.forget();
        }
    }
}

#[async_trait]
impl TextModel for GatedTextModel {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ModelError> {
        self.entered.add_permits(1);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.inner.generate_text(request).await
    }
}

/// Image model popping scripted answers, then returning a small PNG
#[derive(Default)]
pub struct ScriptedImageModel {
    script: Mutex<VecDeque<Result<ImageOutput, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedImageModel {
    pub fn new(script: Vec<Result<ImageOutput, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

pub fn sample_png() -> ImageOutput {
    ImageOutput::Image(InlineImage {
        mime_type: "image/png".into(),
        data: SAMPLE_PNG_DATA.into(),
    })
}

#[async_trait]
impl ImageModel for ScriptedImageModel {
    async fn generate_image(&self, prompt: &str) -> Result<ImageOutput, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        self.script.lock().pop_front().unwrap_or_else(|| Ok(sample_png()))
    }
}

/// Memory store that counts writes and can be told to fail them
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    puts: AtomicUsize,
    fail_puts: AtomicBool,
    written: Mutex<Vec<SiteInstance>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Every snapshot handed to `put`, in order
    pub fn written(&self) -> Vec<SiteInstance> {
        self.written.lock().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_puts.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SiteStore for CountingStore {
    async fn put(&self, site: &SiteInstance) -> Result<(), StoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: format!("{}.json", site.id).into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.written.lock().push(site.clone());
        self.inner.put(site).await
    }

    async fn get(&self, id: SiteId) -> Result<Option<SiteInstance>, StoreError> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> Result<Vec<SiteInstance>, StoreError> {
        self.inner.get_all().await
    }
}
