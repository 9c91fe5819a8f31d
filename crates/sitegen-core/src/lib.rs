//! Sitegen Core - generation, editing and persistence of site documents
//!
//! Provides:
//! - [`ContentGenerator`]: inputs to a complete document (copy plus four images)
//! - [`EditMerger`]: natural-language edits with protected-field restore
//! - [`SiteStore`]: local persistence ([`MemoryStore`], [`DirectoryStore`])
//! - [`EditorSession`]: the editor state machine with debounced autosave,
//!   single-level undo, reset and publish
//! - Collaborators: [`Publisher`], [`LeadSink`], [`CredentialProvider`]
//!
//! # Example
//!
//! ```rust,ignore
//! use sitegen_core::{ContentGenerator, EditMerger, EditorSession, MemoryStore};
//!
//! let session = EditorSession::new(Arc::new(MemoryStore::new()), generator, merger);
//! let id = session.generate(inputs).await?;
//! session.apply_ai_edit("make the headline shorter").await?;
//! session.undo().await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cancel;
pub mod collaborators;
pub mod config;
pub mod editor;
pub mod error;
pub mod generator;
pub mod merger;
pub mod prompts;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use cancel::CancelToken;
pub use collaborators::{
    ConfigCredentials, CredentialProvider, Deployment, HttpPublisher, LeadSink, NoopLeadSink,
    Publisher, UnconfiguredPublisher, WebhookLeadSink,
};
pub use config::SiteGenConfig;
pub use editor::{EditorSession, EditorState, Phase, DEFAULT_DEBOUNCE};
pub use error::{
    Cancelled, ConfigError, EditError, EditorError, ErrorKind, GenerationError, LeadError,
    PublishError, StoreError,
};
pub use generator::{placeholder_url, ContentGenerator};
pub use merger::EditMerger;
pub use store::{DirectoryStore, MemoryStore, SiteStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
