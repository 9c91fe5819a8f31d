//! Model client configuration

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model endpoint, model names, credential and call policy
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// REST base URL (up to and including the API version)
    pub api_base: String,
    /// Model used for JSON text generation
    pub text_model: String,
    /// Model used for image generation
    pub image_model: String,
    /// API key; never serialized
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
    /// Retry policy for text calls
    pub text_retry: RetryPolicy,
}

impl ModelConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// With text retry policy
    #[inline]
    #[must_use]
    pub fn with_text_retry(mut self, policy: RetryPolicy) -> Self {
        self.text_retry = policy;
        self
    }

    /// Whether a non-blank API key is configured
    #[inline]
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-3-flash-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_key: None,
            request_timeout_secs: None,
            text_retry: RetryPolicy::default(),
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_base", &self.api_base)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("text_retry", &self.text_retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = ModelConfig::new().with_api_key("secret-key");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn blank_key_is_not_a_credential() {
        assert!(!ModelConfig::new().has_api_key());
        assert!(!ModelConfig::new().with_api_key("  ").has_api_key());
        assert!(ModelConfig::new().with_api_key("k").has_api_key());
    }

    #[test]
    fn no_timeout_by_default() {
        assert_eq!(ModelConfig::default().request_timeout_secs, None);
    }
}
