//! Error types for Sitegen Core
//!
//! Provides error handling for:
//! - Content generation (input, model invocation, model output)
//! - AI edit merging
//! - Local persistence
//! - Collaborators (publish, lead capture)
//! - Editor session transitions

use crate::editor::Phase;
use sitegen_document::{DocumentError, SiteId};
use sitegen_model::ModelError;
use std::path::PathBuf;

/// Coarse classification shared by generation and edit failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied blank or malformed input; no model call was made
    InputValidation,
    /// The model call itself failed (network, credential, quota)
    ModelInvocation,
    /// The model answered but the answer was unusable
    ModelOutput,
    /// The caller abandoned the request
    Cancelled,
}

/// Marker returned when a [`CancelToken`](crate::CancelToken) fires first
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Errors raised by [`ContentGenerator`](crate::ContentGenerator)
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Blank or malformed generator inputs
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Text model call failed
    #[error("model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),

    /// Text model output was not a valid document
    #[error("model output rejected: {0}")]
    ModelOutput(#[source] DocumentError),

    /// Cancelled before completion
    #[error("generation cancelled")]
    Cancelled,
}

impl From<DocumentError> for GenerationError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidInput(message) => Self::InvalidInput(message),
            other => Self::ModelOutput(other),
        }
    }
}

impl From<Cancelled> for GenerationError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl GenerationError {
    /// Failure classification
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InputValidation,
            Self::ModelInvocation(_) => ErrorKind::ModelInvocation,
            Self::ModelOutput(_) => ErrorKind::ModelOutput,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Check if the same request could succeed when retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ModelInvocation(e) => e.is_retryable(),
            Self::ModelOutput(_) => true,
            _ => false,
        }
    }

    /// Check if the credential should be re-selected
    #[inline]
    #[must_use]
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::ModelInvocation(e) if e.is_credential_problem())
    }
}

/// Errors raised by [`EditMerger`](crate::EditMerger)
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Blank instruction
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Text model call failed
    #[error("model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),

    /// Edited output was not a valid document
    #[error("model output rejected: {0}")]
    ModelOutput(#[source] DocumentError),

    /// Cancelled before completion
    #[error("edit cancelled")]
    Cancelled,
}

impl From<DocumentError> for EditError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidInput(message) => Self::InvalidInput(message),
            other => Self::ModelOutput(other),
        }
    }
}

impl From<Cancelled> for EditError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl EditError {
    /// Failure classification
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InputValidation,
            Self::ModelInvocation(_) => ErrorKind::ModelInvocation,
            Self::ModelOutput(_) => ErrorKind::ModelOutput,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Check if the same instruction could succeed when retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ModelInvocation(e) => e.is_retryable(),
            Self::ModelOutput(_) => true,
            _ => false,
        }
    }
}

/// Errors raised by [`SiteStore`](crate::SiteStore) implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("store I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored record could not be decoded
    #[error("corrupt record at {}: {message}", path.display())]
    Corrupt {
        /// Offending file
        path: PathBuf,
        /// Decoder message
        message: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the deployment collaborator
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// No deployment endpoint configured
    #[error("no publish endpoint configured")]
    NotConfigured,

    /// Network failure
    #[error("publish transport error: {0}")]
    Transport(String),

    /// The deployment service refused the request
    #[error("publish rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Response body or message
        message: String,
    },

    /// The deployment service answered with something unexpected
    #[error("invalid publish response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Lead capture failure; logged, never surfaced to the user
#[derive(Debug, thiserror::Error)]
#[error("lead capture failed: {0}")]
pub struct LeadError(pub String);

impl From<reqwest::Error> for LeadError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`SiteGenConfig`](crate::SiteGenConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Errors raised by [`EditorSession`](crate::EditorSession)
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Another model request is pending
    #[error("an AI request is already in progress")]
    Busy,

    /// The requested operation is not legal in the current state
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current phase
        from: Phase,
        /// Requested phase
        to: Phase,
    },

    /// No site is active
    #[error("no active site")]
    NoActiveSite,

    /// No stored site with this id
    #[error("site not found: {0}")]
    NotFound(SiteId),

    /// Destructive operation needs explicit confirmation
    #[error("confirmation required")]
    ConfirmationRequired,

    /// Undo slot is empty
    #[error("nothing to undo")]
    NothingToUndo,

    /// Direct edit rejected
    #[error("edit rejected: {0}")]
    Field(#[from] DocumentError),

    /// Generation failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// AI edit failed
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Persistence failed
    #[error("save failed: {0}")]
    Store(#[from] StoreError),

    /// Deployment failed
    #[error("deployment failed: {0}")]
    Publish(#[from] PublishError),
}

impl EditorError {
    /// Check if the error came from a model request that can be retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Generation(e) => e.is_retryable(),
            Self::Edit(e) => e.is_retryable(),
            _ => false,
        }
    }
}
