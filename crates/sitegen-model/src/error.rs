//! Error types for model invocation

/// Errors raised by text and image model calls
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No API key is configured
    #[error("no model credential configured")]
    MissingCredential,

    /// Network or connection failure
    #[error("model transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("model call timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-success HTTP status
    #[error("model returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The configured model does not exist or the key cannot reach it
    #[error("model not found or API key restricted: {0}")]
    ModelNotFound(String),

    /// Response body could not be decoded
    #[error("model response could not be decoded: {0}")]
    Decode(String),

    /// Inline image data is not valid base64
    #[error("invalid inline image data: {0}")]
    InvalidImageData(String),
}

impl ModelError {
    /// Check if error is transient and worth retrying
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if the credential should be re-selected
    #[inline]
    #[must_use]
    pub fn is_credential_problem(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::ModelNotFound(_) | Self::Status { status: 401 | 403, .. }
        )
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
