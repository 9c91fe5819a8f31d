//! Protected fields
//!
//! Image fields and the contact block are outside natural-language edit
//! authority. [`ProtectedFields`] captures them from a document and writes
//! them back over anything a model returned.

use crate::document::{Contact, Document};
use serde_json::Value;
use std::fmt;

/// Marker that replaces image payloads in outbound model requests
pub const PRESERVED_SENTINEL: &str = "[PRESERVED]";

/// Image-bearing fields of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    /// `hero.heroImage`
    Hero,
    /// `industryValue.valueImage`
    IndustryValue,
    /// `aboutUs.image`
    AboutUs,
    /// `repairBenefits.image`
    RepairBenefits,
}

impl ImageSlot {
    /// Every slot, in generation order
    pub const ALL: [ImageSlot; 4] = [
        ImageSlot::Hero,
        ImageSlot::IndustryValue,
        ImageSlot::AboutUs,
        ImageSlot::RepairBenefits,
    ];

    /// Dotted field name
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Hero => "hero.heroImage",
            Self::IndustryValue => "industryValue.valueImage",
            Self::AboutUs => "aboutUs.image",
            Self::RepairBenefits => "repairBenefits.image",
        }
    }

    /// (section, key) location in the serialized document
    const fn location(self) -> (&'static str, &'static str) {
        match self {
            Self::Hero => ("hero", "heroImage"),
            Self::IndustryValue => ("industryValue", "valueImage"),
            Self::AboutUs => ("aboutUs", "image"),
            Self::RepairBenefits => ("repairBenefits", "image"),
        }
    }

    /// Read the slot's image
    #[must_use]
    pub fn get(self, document: &Document) -> &str {
        match self {
            Self::Hero => &document.hero.hero_image,
            Self::IndustryValue => &document.industry_value.value_image,
            Self::AboutUs => &document.about_us.image,
            Self::RepairBenefits => &document.repair_benefits.image,
        }
    }

    /// Mutable access to the slot's image
    pub fn get_mut(self, document: &mut Document) -> &mut String {
        match self {
            Self::Hero => &mut document.hero.hero_image,
            Self::IndustryValue => &mut document.industry_value.value_image,
            Self::AboutUs => &mut document.about_us.image,
            Self::RepairBenefits => &mut document.repair_benefits.image,
        }
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Snapshot of every protected field of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedFields {
    images: [(ImageSlot, String); 4],
    contact: Contact,
}

impl ProtectedFields {
    /// Capture protected values from `document`
    #[must_use]
    pub fn capture(document: &Document) -> Self {
        Self {
            images: ImageSlot::ALL.map(|slot| (slot, slot.get(document).to_string())),
            contact: document.contact.clone(),
        }
    }

    /// Overwrite the protected fields of `document` with the captured values
    pub fn restore(&self, document: &mut Document) {
        for (slot, value) in &self.images {
            slot.get_mut(document).clone_from(value);
        }
        document.contact.clone_from(&self.contact);
    }

    /// Captured contact block
    #[inline]
    #[must_use]
    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Captured value for one image slot
    #[must_use]
    pub fn image(&self, slot: ImageSlot) -> &str {
        self.images
            .iter()
            .find(|(s, _)| *s == slot)
            .map_or("", |(_, v)| v.as_str())
    }
}

/// Serialize `document` with every image payload replaced by the sentinel
///
/// Empty image fields stay empty so the model is not told an image
/// exists where none does.
#[must_use]
pub fn redact_images(document: &Document) -> Value {
    let mut value = serde_json::to_value(document).unwrap_or(Value::Null);
    for slot in ImageSlot::ALL {
        let (section, key) = slot.location();
        if let Some(field) = value.get_mut(section).and_then(|s| s.get_mut(key)) {
            if field.as_str().is_some_and(|s| !s.is_empty()) {
                *field = Value::String(PRESERVED_SENTINEL.to_string());
            }
        }
    }
    value
}
