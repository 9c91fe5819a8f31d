//! Typed field accessors for direct edits
//!
//! Every editable text field has a [`TextField`] value. The contact block
//! has none: it only changes through generator inputs.

use crate::document::{Card, Document};
use crate::error::DocumentError;
use crate::protected::ImageSlot;
use std::fmt;

/// Card-bearing arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardList {
    /// `services.cards`
    Services,
    /// `repairBenefits.items`
    RepairBenefits,
    /// `additionalBenefits.cards`
    AdditionalBenefits,
}

impl CardList {
    const fn name(self) -> &'static str {
        match self {
            Self::Services => "services.cards",
            Self::RepairBenefits => "repairBenefits.items",
            Self::AdditionalBenefits => "additionalBenefits.cards",
        }
    }

    fn cards(self, document: &Document) -> &[Card] {
        match self {
            Self::Services => &document.services.cards,
            Self::RepairBenefits => &document.repair_benefits.items,
            Self::AdditionalBenefits => &document.additional_benefits.cards,
        }
    }

    fn cards_mut(self, document: &mut Document) -> &mut [Card] {
        match self {
            Self::Services => &mut document.services.cards,
            Self::RepairBenefits => &mut document.repair_benefits.items,
            Self::AdditionalBenefits => &mut document.additional_benefits.cards,
        }
    }
}

/// Text part of a [`Card`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardPart {
    /// `title`
    Title,
    /// `description`
    Description,
    /// `icon`
    Icon,
}

/// Line of the hero headline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadlineLine {
    /// `line1`
    Line1,
    /// `line2`
    Line2,
    /// `line3`
    Line3,
}

/// Text part of an FAQ entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaqPart {
    /// `question`
    Question,
    /// `answer`
    Answer,
}

/// Editable text field of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    /// `bannerText`
    BannerText,
    /// `hero.badge`
    HeroBadge,
    /// `hero.headline.lineN`
    HeroHeadline(HeadlineLine),
    /// `hero.subtext`
    HeroSubtext,
    /// One part of one card in a card list
    Card {
        /// Which array
        list: CardList,
        /// Position in the array
        index: usize,
        /// Which text
        part: CardPart,
    },
    /// `repairBenefits.title`
    RepairBenefitsTitle,
    /// `aboutUs.title`
    AboutUsTitle,
    /// `aboutUs.content`
    AboutUsContent,
    /// `whyItMatters.title`
    WhyItMattersTitle,
    /// `whyItMatters.content`
    WhyItMattersContent,
    /// `industryValue.title`
    IndustryValueTitle,
    /// `industryValue.content`
    IndustryValueContent,
    /// `benefits.items[i]`
    Benefit(usize),
    /// One part of one FAQ entry
    Faq {
        /// Position in `faqs`
        index: usize,
        /// Which text
        part: FaqPart,
    },
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BannerText => f.write_str("bannerText"),
            Self::HeroBadge => f.write_str("hero.badge"),
            Self::HeroHeadline(line) => {
                let n = match line {
                    HeadlineLine::Line1 => 1,
                    HeadlineLine::Line2 => 2,
                    HeadlineLine::Line3 => 3,
                };
                write!(f, "hero.headline.line{n}")
            }
            Self::HeroSubtext => f.write_str("hero.subtext"),
            Self::Card { list, index, part } => {
                let part = match part {
                    CardPart::Title => "title",
                    CardPart::Description => "description",
                    CardPart::Icon => "icon",
                };
                write!(f, "{}[{index}].{part}", list.name())
            }
            Self::RepairBenefitsTitle => f.write_str("repairBenefits.title"),
            Self::AboutUsTitle => f.write_str("aboutUs.title"),
            Self::AboutUsContent => f.write_str("aboutUs.content"),
            Self::WhyItMattersTitle => f.write_str("whyItMatters.title"),
            Self::WhyItMattersContent => f.write_str("whyItMatters.content"),
            Self::IndustryValueTitle => f.write_str("industryValue.title"),
            Self::IndustryValueContent => f.write_str("industryValue.content"),
            Self::Benefit(index) => write!(f, "benefits.items[{index}]"),
            Self::Faq { index, part } => {
                let part = match part {
                    FaqPart::Question => "question",
                    FaqPart::Answer => "answer",
                };
                write!(f, "faqs[{index}].{part}")
            }
        }
    }
}

fn out_of_range(field: TextField, len: usize) -> DocumentError {
    DocumentError::FieldOutOfRange {
        field: field.to_string(),
        len,
    }
}

impl TextField {
    /// Read the field
    ///
    /// # Errors
    /// `DocumentError::FieldOutOfRange` for an index past the array end
    pub fn get(self, document: &Document) -> Result<&str, DocumentError> {
        let value = match self {
            Self::BannerText => &document.banner_text,
            Self::HeroBadge => &document.hero.badge,
            Self::HeroHeadline(HeadlineLine::Line1) => &document.hero.headline.line1,
            Self::HeroHeadline(HeadlineLine::Line2) => &document.hero.headline.line2,
            Self::HeroHeadline(HeadlineLine::Line3) => &document.hero.headline.line3,
            Self::HeroSubtext => &document.hero.subtext,
            Self::Card { list, index, part } => {
                let cards = list.cards(document);
                let card = cards.get(index).ok_or_else(|| out_of_range(self, cards.len()))?;
                match part {
                    CardPart::Title => &card.title,
                    CardPart::Description => &card.description,
                    CardPart::Icon => &card.icon,
                }
            }
            Self::RepairBenefitsTitle => &document.repair_benefits.title,
            Self::AboutUsTitle => &document.about_us.title,
            Self::AboutUsContent => &document.about_us.content,
            Self::WhyItMattersTitle => &document.why_it_matters.title,
            Self::WhyItMattersContent => &document.why_it_matters.content,
            Self::IndustryValueTitle => &document.industry_value.title,
            Self::IndustryValueContent => &document.industry_value.content,
            Self::Benefit(index) => {
                let items = &document.benefits.items;
                items.get(index).ok_or_else(|| out_of_range(self, items.len()))?
            }
            Self::Faq { index, part } => {
                let faq = document
                    .faqs
                    .get(index)
                    .ok_or_else(|| out_of_range(self, document.faqs.len()))?;
                match part {
                    FaqPart::Question => &faq.question,
                    FaqPart::Answer => &faq.answer,
                }
            }
        };
        Ok(value.as_str())
    }

    /// Mutable access to the field
    ///
    /// # Errors
    /// `DocumentError::FieldOutOfRange` for an index past the array end
    pub fn get_mut(self, document: &mut Document) -> Result<&mut String, DocumentError> {
        let value = match self {
            Self::BannerText => &mut document.banner_text,
            Self::HeroBadge => &mut document.hero.badge,
            Self::HeroHeadline(HeadlineLine::Line1) => &mut document.hero.headline.line1,
            Self::HeroHeadline(HeadlineLine::Line2) => &mut document.hero.headline.line2,
            Self::HeroHeadline(HeadlineLine::Line3) => &mut document.hero.headline.line3,
            Self::HeroSubtext => &mut document.hero.subtext,
            Self::Card { list, index, part } => {
                let cards = list.cards_mut(document);
                let len = cards.len();
                let card = cards.get_mut(index).ok_or_else(|| out_of_range(self, len))?;
                match part {
                    CardPart::Title => &mut card.title,
                    CardPart::Description => &mut card.description,
                    CardPart::Icon => &mut card.icon,
                }
            }
            Self::RepairBenefitsTitle => &mut document.repair_benefits.title,
            Self::AboutUsTitle => &mut document.about_us.title,
            Self::AboutUsContent => &mut document.about_us.content,
            Self::WhyItMattersTitle => &mut document.why_it_matters.title,
            Self::WhyItMattersContent => &mut document.why_it_matters.content,
            Self::IndustryValueTitle => &mut document.industry_value.title,
            Self::IndustryValueContent => &mut document.industry_value.content,
            Self::Benefit(index) => {
                let items = &mut document.benefits.items;
                let len = items.len();
                items.get_mut(index).ok_or_else(|| out_of_range(self, len))?
            }
            Self::Faq { index, part } => {
                let len = document.faqs.len();
                let faq = document
                    .faqs
                    .get_mut(index)
                    .ok_or_else(|| out_of_range(self, len))?;
                match part {
                    FaqPart::Question => &mut faq.question,
                    FaqPart::Answer => &mut faq.answer,
                }
            }
        };
        Ok(value)
    }
}

/// A user edit applied directly to the active document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectEdit {
    /// Replace the text of one field
    SetText {
        /// Target field
        field: TextField,
        /// New text
        value: String,
    },
    /// Replace an image with an uploaded data URI or URL
    ReplaceImage {
        /// Target slot
        slot: ImageSlot,
        /// Data URI or URL
        uri: String,
    },
}

impl DirectEdit {
    /// Convenience constructor for text edits
    #[must_use]
    pub fn text(field: TextField, value: impl Into<String>) -> Self {
        Self::SetText {
            field,
            value: value.into(),
        }
    }

    /// Apply the edit in place
    ///
    /// # Errors
    /// - `DocumentError::EmptyValue` for a blank value
    /// - `DocumentError::FieldOutOfRange` for a bad array index
    pub fn apply(&self, document: &mut Document) -> Result<(), DocumentError> {
        match self {
            Self::SetText { field, value } => {
                if value.trim().is_empty() {
                    return Err(DocumentError::EmptyValue(field.to_string()));
                }
                field.get_mut(document)?.clone_from(value);
            }
            Self::ReplaceImage { slot, uri } => {
                if uri.trim().is_empty() {
                    return Err(DocumentError::EmptyValue(slot.to_string()));
                }
                slot.get_mut(document).clone_from(uri);
            }
        }
        Ok(())
    }
}
