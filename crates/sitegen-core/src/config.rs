//! Workspace configuration
//!
//! Loaded from TOML, then overlaid with environment variables. CLI flags
//! are applied last by the binary.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use sitegen_model::ModelConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables read by [`SiteGenConfig::apply_env`]
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
pub const ENV_LEAD_WEBHOOK_URL: &str = "SITEGEN_LEAD_WEBHOOK_URL";
pub const ENV_PUBLISH_URL: &str = "SITEGEN_PUBLISH_URL";
pub const ENV_STORE_DIR: &str = "SITEGEN_STORE_DIR";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteGenConfig {
    /// Model endpoint, names and call policy
    pub model: ModelConfig,
    /// Directory holding one JSON record per site
    pub store_dir: PathBuf,
    /// Trailing debounce for direct-edit persistence
    pub debounce_ms: u64,
    /// Base URL for image placeholders
    pub placeholder_base_url: String,
    /// Lead capture webhook; lead capture is skipped when unset
    pub lead_webhook_url: Option<String>,
    /// `source` tag sent with lead notifications
    pub lead_source: String,
    /// Deployment endpoint; publishing fails when unset
    pub publish_url: Option<String>,
    /// Address the HTTP surface binds to
    pub bind_addr: String,
}

impl Default for SiteGenConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            store_dir: PathBuf::from("sites"),
            debounce_ms: 600,
            placeholder_base_url: "https://placehold.co/1200x800".to_string(),
            lead_webhook_url: None,
            lead_source: "sitegen".to_string(),
            publish_url: None,
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl SiteGenConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if unreadable, otherwise as [`Self::from_toml_str`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Overlay values from the process environment
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    ///
    /// Blank values are ignored. `GEMINI_API_KEY` wins over `API_KEY`.
    #[must_use]
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK)) {
            self.model.api_key = Some(key);
        }
        if let Some(url) = get(ENV_LEAD_WEBHOOK_URL) {
            self.lead_webhook_url = Some(url);
        }
        if let Some(url) = get(ENV_PUBLISH_URL) {
            self.publish_url = Some(url);
        }
        if let Some(dir) = get(ENV_STORE_DIR) {
            self.store_dir = PathBuf::from(dir);
        }
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the offending key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.text_retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "model.text_retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.placeholder_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "placeholder_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// With model configuration
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// With store directory
    #[inline]
    #[must_use]
    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = dir.into();
        self
    }

    /// With debounce interval
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// With lead webhook
    #[inline]
    #[must_use]
    pub fn with_lead_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.lead_webhook_url = Some(url.into());
        self
    }

    /// With publish endpoint
    #[inline]
    #[must_use]
    pub fn with_publish_url(mut self, url: impl Into<String>) -> Self {
        self.publish_url = Some(url.into());
        self
    }

    /// With bind address
    #[inline]
    #[must_use]
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Debounce interval as a duration
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = SiteGenConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(600));
        assert!(config.lead_webhook_url.is_none());
        assert!(!config.model.has_api_key());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SiteGenConfig::from_toml_str(
            r#"
            store_dir = "/tmp/sites"
            debounce_ms = 250

            [model]
            text_model = "gemini-custom"
            request_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.store_dir, PathBuf::from("/tmp/sites"));
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.model.text_model, "gemini-custom");
        assert_eq!(config.model.request_timeout_secs, Some(30));
        assert_eq!(config.model.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.lead_source, "sitegen");
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let err = SiteGenConfig::from_toml_str(
            "[model.text_retry]\nmax_attempts = 0\nbase_backoff_ms = 10\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn env_overrides_and_key_precedence() {
        let vars: HashMap<&str, &str> = [
            ("API_KEY", "fallback"),
            ("GEMINI_API_KEY", "primary"),
            ("SITEGEN_STORE_DIR", "/var/sites"),
            ("SITEGEN_PUBLISH_URL", "  "),
        ]
        .into_iter()
        .collect();

        let config = SiteGenConfig::new()
            .with_publish_url("https://deploy.local")
            .apply_env_from(|k| vars.get(k).map(ToString::to_string));

        assert_eq!(config.model.api_key.as_deref(), Some("primary"));
        assert_eq!(config.store_dir, PathBuf::from("/var/sites"));
        assert_eq!(config.publish_url.as_deref(), Some("https://deploy.local"));
    }

    #[test]
    fn fallback_key_is_used_alone() {
        let config = SiteGenConfig::new()
            .apply_env_from(|k| (k == "API_KEY").then(|| "fallback".to_string()));
        assert_eq!(config.model.api_key.as_deref(), Some("fallback"));
    }
}
