//! The generated site document
//!
//! Field names serialize in camelCase, matching what the text model is
//! asked to produce. Image fields default to empty because the text model
//! never fills them; the generator does.

use crate::error::DocumentError;
use crate::schema::{
    Cardinality, ADDITIONAL_BENEFIT_CARDS, BENEFIT_ITEMS, FAQS, REPAIR_BENEFIT_ITEMS,
    SERVICE_CARDS,
};
use serde::{Deserialize, Serialize};

/// Icon card used by services, repair benefits and additional benefits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Short card heading
    pub title: String,
    /// One or two sentences of body copy
    pub description: String,
    /// Lucide icon name in dash-case
    pub icon: String,
}

/// Single question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    /// Question as a homeowner would ask it
    pub question: String,
    /// Answer text
    pub answer: String,
}

/// Three-line hero headline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    /// First line
    pub line1: String,
    /// Second line
    pub line2: String,
    /// Third line
    pub line3: String,
}

/// Top-of-page hero section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    /// Small label above the headline
    pub badge: String,
    /// Main headline
    pub headline: Headline,
    /// Supporting sentence under the headline
    pub subtext: String,
    /// Data URI or URL; filled by the generator
    #[serde(default)]
    pub hero_image: String,
}

/// Service cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Services {
    /// Exactly four cards
    pub cards: Vec<Card>,
}

/// Repair benefits with an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairBenefits {
    /// Section heading
    pub title: String,
    /// Data URI or URL; filled by the generator
    #[serde(default)]
    pub image: String,
    /// Exactly three cards
    pub items: Vec<Card>,
}

/// About-us section with an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutUs {
    /// Section heading
    pub title: String,
    /// Body copy
    pub content: String,
    /// Data URI or URL; filled by the generator
    #[serde(default)]
    pub image: String,
}

/// Plain title + body section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitledContent {
    /// Section heading
    pub title: String,
    /// Body copy
    pub content: String,
}

/// Additional benefit cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalBenefits {
    /// Exactly three cards
    pub cards: Vec<Card>,
}

/// Industry value section with an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryValue {
    /// Section heading
    pub title: String,
    /// Body copy
    pub content: String,
    /// Data URI or URL; filled by the generator
    #[serde(default)]
    pub value_image: String,
}

/// Short benefit bullets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benefits {
    /// Three to six items
    pub items: Vec<String>,
}

/// Authoritative contact block, copied from the generator inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Phone number as entered
    pub phone: String,
    /// Service area, e.g. "Austin, TX"
    pub location: String,
    /// Business name
    pub company_name: String,
}

impl Contact {
    /// Every field has non-blank text
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.phone, &self.location, &self.company_name]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Structured content of one generated site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// One-line strip above the hero
    pub banner_text: String,
    /// Headline, subtext and hero image
    pub hero: Hero,
    /// Four service cards
    pub services: Services,
    /// Repair benefits with image
    pub repair_benefits: RepairBenefits,
    /// Local presence summary with image
    pub about_us: AboutUs,
    /// Why the service matters in general
    pub why_it_matters: TitledContent,
    /// Three extra benefit cards
    pub additional_benefits: AdditionalBenefits,
    /// Industry value with image
    pub industry_value: IndustryValue,
    /// Benefit bullets
    pub benefits: Benefits,
    /// Exactly four entries
    pub faqs: Vec<Faq>,
    /// Never taken from model output
    pub contact: Contact,
}

impl Document {
    /// Validate text fields and array cardinalities
    ///
    /// Image fields are not checked; model output never carries them.
    ///
    /// # Errors
    /// `DocumentError::SchemaViolation` listing every problem found
    pub fn validate_content(&self) -> Result<(), DocumentError> {
        let violations = self.content_violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DocumentError::SchemaViolation(violations))
        }
    }

    /// Validate the complete document, including image and contact fields
    ///
    /// # Errors
    /// `DocumentError::SchemaViolation` listing every problem found
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut violations = self.content_violations();
        require_text(&mut violations, "hero.heroImage", &self.hero.hero_image);
        require_text(&mut violations, "repairBenefits.image", &self.repair_benefits.image);
        require_text(&mut violations, "aboutUs.image", &self.about_us.image);
        require_text(&mut violations, "industryValue.valueImage", &self.industry_value.value_image);
        require_text(&mut violations, "contact.phone", &self.contact.phone);
        require_text(&mut violations, "contact.location", &self.contact.location);
        require_text(&mut violations, "contact.companyName", &self.contact.company_name);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DocumentError::SchemaViolation(violations))
        }
    }

    fn content_violations(&self) -> Vec<String> {
        let mut v = Vec::new();

        require_text(&mut v, "bannerText", &self.banner_text);
        require_text(&mut v, "hero.badge", &self.hero.badge);
        require_text(&mut v, "hero.headline.line1", &self.hero.headline.line1);
        require_text(&mut v, "hero.headline.line2", &self.hero.headline.line2);
        require_text(&mut v, "hero.headline.line3", &self.hero.headline.line3);
        require_text(&mut v, "hero.subtext", &self.hero.subtext);

        require_cards(&mut v, "services.cards", &self.services.cards, SERVICE_CARDS);

        require_text(&mut v, "repairBenefits.title", &self.repair_benefits.title);
        require_cards(
            &mut v,
            "repairBenefits.items",
            &self.repair_benefits.items,
            REPAIR_BENEFIT_ITEMS,
        );

        require_text(&mut v, "aboutUs.title", &self.about_us.title);
        require_text(&mut v, "aboutUs.content", &self.about_us.content);
        require_text(&mut v, "whyItMatters.title", &self.why_it_matters.title);
        require_text(&mut v, "whyItMatters.content", &self.why_it_matters.content);

        require_cards(
            &mut v,
            "additionalBenefits.cards",
            &self.additional_benefits.cards,
            ADDITIONAL_BENEFIT_CARDS,
        );

        require_text(&mut v, "industryValue.title", &self.industry_value.title);
        require_text(&mut v, "industryValue.content", &self.industry_value.content);

        require_len(&mut v, "benefits.items", self.benefits.items.len(), BENEFIT_ITEMS);
        for (i, item) in self.benefits.items.iter().enumerate() {
            require_text(&mut v, &format!("benefits.items[{i}]"), item);
        }

        require_len(&mut v, "faqs", self.faqs.len(), FAQS);
        for (i, faq) in self.faqs.iter().enumerate() {
            require_text(&mut v, &format!("faqs[{i}].question"), &faq.question);
            require_text(&mut v, &format!("faqs[{i}].answer"), &faq.answer);
        }

        v
    }
}

fn require_text(violations: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        violations.push(format!("{field} is empty"));
    }
}

fn require_len(violations: &mut Vec<String>, field: &str, len: usize, bounds: Cardinality) {
    if !bounds.contains(len) {
        violations.push(format!("{field} has {len} entries, expected {bounds}"));
    }
}

fn require_cards(violations: &mut Vec<String>, field: &str, cards: &[Card], bounds: Cardinality) {
    require_len(violations, field, cards.len(), bounds);
    for (i, card) in cards.iter().enumerate() {
        require_text(violations, &format!("{field}[{i}].title"), &card.title);
        require_text(violations, &format!("{field}[{i}].description"), &card.description);
        require_text(violations, &format!("{field}[{i}].icon"), &card.icon);
    }
}
