//! Document schema
//!
//! One schema definition drives three things:
//! - the response schema sent to the text model (model dialect)
//! - JSON Schema validation of raw model output
//! - the cardinality bounds checked by [`Document::validate_content`]

use crate::document::Document;
use crate::error::DocumentError;
use jsonschema::JSONSchema;
use serde_json::{json, Map, Value};
use std::fmt;

/// Inclusive bounds on an array length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    /// Fewest entries allowed
    pub min: usize,
    /// Most entries allowed
    pub max: usize,
}

impl Cardinality {
    /// Exactly `n` entries
    #[inline]
    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: n }
    }

    /// Between `min` and `max` entries inclusive
    #[inline]
    #[must_use]
    pub const fn between(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Check a length against the bounds
    #[inline]
    #[must_use]
    pub const fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "exactly {}", self.min)
        } else {
            write!(f, "{} to {}", self.min, self.max)
        }
    }
}

/// `services.cards`
pub const SERVICE_CARDS: Cardinality = Cardinality::exactly(4);
/// `repairBenefits.items`
pub const REPAIR_BENEFIT_ITEMS: Cardinality = Cardinality::exactly(3);
/// `additionalBenefits.cards`
pub const ADDITIONAL_BENEFIT_CARDS: Cardinality = Cardinality::exactly(3);
/// `benefits.items`
pub const BENEFIT_ITEMS: Cardinality = Cardinality::between(3, 6);
/// `faqs`
pub const FAQS: Cardinality = Cardinality::exactly(4);

/// Top-level sections every model response must carry
pub const REQUIRED_SECTIONS: [&str; 11] = [
    "bannerText",
    "hero",
    "services",
    "repairBenefits",
    "aboutUs",
    "whyItMatters",
    "additionalBenefits",
    "industryValue",
    "benefits",
    "faqs",
    "contact",
];

/// Keywords the model dialect does not accept
const MODEL_UNSUPPORTED_KEYWORDS: [&str; 2] = ["minLength", "additionalProperties"];

fn text() -> Value {
    json!({ "type": "string", "minLength": 1 })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

fn array(items: Value, bounds: Cardinality) -> Value {
    json!({
        "type": "array",
        "items": items,
        "minItems": bounds.min,
        "maxItems": bounds.max,
    })
}

fn card() -> Value {
    object(
        json!({ "title": text(), "description": text(), "icon": text() }),
        &["title", "description", "icon"],
    )
}

fn titled_content() -> Value {
    object(json!({ "title": text(), "content": text() }), &["title", "content"])
}

/// The document schema in standard JSON Schema form
///
/// Image fields are deliberately absent: the text model never produces
/// them and validation must not reject responses that echo them back.
#[must_use]
pub fn document_json_schema() -> Value {
    let properties = json!({
        "bannerText": text(),
        "hero": object(
            json!({
                "badge": text(),
                "headline": object(
                    json!({ "line1": text(), "line2": text(), "line3": text() }),
                    &["line1", "line2", "line3"],
                ),
                "subtext": text(),
            }),
            &["badge", "headline", "subtext"],
        ),
        "services": object(json!({ "cards": array(card(), SERVICE_CARDS) }), &["cards"]),
        "repairBenefits": object(
            json!({ "title": text(), "items": array(card(), REPAIR_BENEFIT_ITEMS) }),
            &["title", "items"],
        ),
        "aboutUs": titled_content(),
        "whyItMatters": titled_content(),
        "additionalBenefits": object(
            json!({ "cards": array(card(), ADDITIONAL_BENEFIT_CARDS) }),
            &["cards"],
        ),
        "industryValue": titled_content(),
        "benefits": object(json!({ "items": array(text(), BENEFIT_ITEMS) }), &["items"]),
        "faqs": array(
            object(json!({ "question": text(), "answer": text() }), &["question", "answer"]),
            FAQS,
        ),
        "contact": object(
            json!({ "phone": text(), "location": text(), "companyName": text() }),
            &["phone", "location", "companyName"],
        ),
    });

    object(properties, &REQUIRED_SECTIONS)
}

/// Rewrite a JSON Schema into the model's response-schema dialect
///
/// The dialect spells types in upper case and rejects a few keywords.
#[must_use]
pub fn to_model_dialect(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                if MODEL_UNSUPPORTED_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                let converted = match (key.as_str(), value) {
                    ("type", Value::String(t)) => Value::String(t.to_ascii_uppercase()),
                    // property names are data, not keywords
                    ("properties", Value::Object(props)) => Value::Object(
                        props
                            .iter()
                            .map(|(name, s)| (name.clone(), to_model_dialect(s)))
                            .collect(),
                    ),
                    _ => to_model_dialect(value),
                };
                out.insert(key.clone(), converted);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_model_dialect).collect()),
        other => other.clone(),
    }
}

/// Compiled document schema
pub struct DocumentSchema {
    compiled: JSONSchema,
    model_schema: Value,
}

impl fmt::Debug for DocumentSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSchema").finish_non_exhaustive()
    }
}

impl DocumentSchema {
    /// Compile the document schema
    ///
    /// # Errors
    /// `DocumentError::SchemaCompilation` if the schema is rejected
    pub fn new() -> Result<Self, DocumentError> {
        let schema = document_json_schema();
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| DocumentError::SchemaCompilation(e.to_string()))?;
        Ok(Self {
            compiled,
            model_schema: to_model_dialect(&schema),
        })
    }

    /// Response schema to send with text-model requests
    #[inline]
    #[must_use]
    pub fn model_schema(&self) -> &Value {
        &self.model_schema
    }

    /// Check that every required top-level section is present and non-empty
    ///
    /// # Errors
    /// `DocumentError::MissingField` naming the first absent section
    pub fn check_required(value: &Value) -> Result<(), DocumentError> {
        for key in REQUIRED_SECTIONS {
            let present = match value.get(key) {
                None | Some(Value::Null | Value::Bool(false)) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Array(a)) => !a.is_empty(),
                Some(Value::Object(o)) => !o.is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(DocumentError::MissingField(key.to_string()));
            }
        }
        Ok(())
    }

    /// Validate a raw JSON value against the schema
    ///
    /// # Errors
    /// `DocumentError::SchemaViolation` with one message per failing path
    pub fn validate_value(&self, value: &Value) -> Result<(), DocumentError> {
        if let Err(errors) = self.compiled.validate(value) {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{path}: {e}")
                    }
                })
                .collect();
            return Err(DocumentError::SchemaViolation(messages));
        }
        Ok(())
    }

    /// Parse clean model output into a typed document
    ///
    /// Runs, in order: JSON parse, required-section check, JSON Schema
    /// validation, typed decoding, content validation.
    ///
    /// # Errors
    /// Any of the model-output `DocumentError` variants
    pub fn parse(&self, text: &str) -> Result<Document, DocumentError> {
        let value = Self::parse_value(text)?;
        self.decode(value)
    }

    /// JSON parse plus required-section check, leaving the value untyped
    /// so callers can patch it before decoding
    ///
    /// # Errors
    /// `DocumentError::Unparsable` or `DocumentError::MissingField`
    pub fn parse_value(text: &str) -> Result<Value, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        Self::check_required(&value)?;
        Ok(value)
    }

    /// Schema validation, typed decoding and content validation
    ///
    /// # Errors
    /// `DocumentError::SchemaViolation` or `DocumentError::Unparsable`
    pub fn decode(&self, value: Value) -> Result<Document, DocumentError> {
        self.validate_value(&value)?;
        let document: Document = serde_json::from_value(value)?;
        document.validate_content()?;
        Ok(document)
    }
}
