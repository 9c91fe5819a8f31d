//! Sitegen Document - the data contract of a generated site
//!
//! Provides:
//! - [`Document`]: typed site content with fixed sections
//! - [`DocumentSchema`]: JSON Schema validation and the model response schema
//! - [`ProtectedFields`]: capture/restore of images and contact data
//! - [`TextField`] / [`DirectEdit`]: typed accessors for in-place edits
//! - [`SiteInstance`]: persisted `{id, data, lastSaved}` record
//!
//! # Example
//!
//! ```rust,ignore
//! use sitegen_document::{DocumentSchema, ProtectedFields};
//!
//! let schema = DocumentSchema::new()?;
//! let mut edited = schema.parse(&model_text)?;
//! ProtectedFields::capture(&current).restore(&mut edited);
//! edited.validate()?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod fields;
pub mod inputs;
pub mod protected;
pub mod schema;
pub mod site;

pub use document::{
    AboutUs, AdditionalBenefits, Benefits, Card, Contact, Document, Faq, Headline, Hero,
    IndustryValue, RepairBenefits, Services, TitledContent,
};
pub use error::DocumentError;
pub use fields::{CardList, CardPart, DirectEdit, FaqPart, HeadlineLine, TextField};
pub use inputs::GeneratorInputs;
pub use protected::{redact_images, ImageSlot, ProtectedFields, PRESERVED_SENTINEL};
pub use schema::{Cardinality, DocumentSchema, REQUIRED_SECTIONS};
pub use site::{SiteId, SiteInstance};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
