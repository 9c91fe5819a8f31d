//! External collaborators
//!
//! Narrow traits for the services the editor hands work to:
//! - [`Publisher`]: deploys a document under a project name
//! - [`LeadSink`]: receives generator inputs as a sales lead
//! - [`CredentialProvider`]: reports and (re)selects the model credential
//!
//! Each has an HTTP- or config-backed implementation here; tests use the
//! `mockall` mocks.

use crate::error::{LeadError, PublishError};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitegen_document::{Document, GeneratorInputs};

/// Result of a successful deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Public URL of the deployed site
    pub url: String,
}

/// Deployment capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Deploy `document` under `project_name`
    async fn deploy(&self, document: &Document, project_name: &str)
        -> Result<Deployment, PublishError>;
}

/// Lead notification capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Record the inputs of a generation request
    async fn capture(&self, inputs: &GeneratorInputs) -> Result<(), LeadError>;
}

/// Model credential capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Check if a credential is currently selected
    fn has_credential(&self) -> bool;

    /// Ask the user to select or replace the credential
    async fn prompt_credential(&self);
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployRequest<'a> {
    project_name: &'a str,
    document: &'a Document,
}

/// Publisher that POSTs `{projectName, document}` to a deployment endpoint
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpPublisher {
    /// Create publisher for `endpoint`
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn deploy(
        &self,
        document: &Document,
        project_name: &str,
    ) -> Result<Deployment, PublishError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&DeployRequest {
                project_name,
                document,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let deployment: Deployment = response.json().await?;
        if deployment.url.trim().is_empty() {
            return Err(PublishError::InvalidResponse("empty deployment url".to_string()));
        }
        Ok(deployment)
    }
}

/// Publisher used when no deployment endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredPublisher;

#[async_trait]
impl Publisher for UnconfiguredPublisher {
    async fn deploy(&self, _: &Document, _: &str) -> Result<Deployment, PublishError> {
        Err(PublishError::NotConfigured)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadPayload<'a> {
    #[serde(flatten)]
    inputs: &'a GeneratorInputs,
    timestamp: String,
    source: &'a str,
}

/// Lead sink that POSTs the inputs plus timestamp and source to a webhook
#[derive(Debug, Clone)]
pub struct WebhookLeadSink {
    http: reqwest::Client,
    url: String,
    source: String,
}

impl WebhookLeadSink {
    /// Create sink for `url`, tagging leads with `source`
    #[must_use]
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            source: source.into(),
        }
    }
}

#[async_trait]
impl LeadSink for WebhookLeadSink {
    async fn capture(&self, inputs: &GeneratorInputs) -> Result<(), LeadError> {
        let payload = LeadPayload {
            inputs,
            timestamp: Utc::now().to_rfc3339(),
            source: &self.source,
        };
        let response = self.http.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(LeadError(format!("webhook returned {}", response.status())));
        }
        tracing::debug!(company = %inputs.company_name, "lead captured");
        Ok(())
    }
}

/// Lead sink used when no webhook is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLeadSink;

#[async_trait]
impl LeadSink for NoopLeadSink {
    async fn capture(&self, inputs: &GeneratorInputs) -> Result<(), LeadError> {
        tracing::warn!(company = %inputs.company_name, "lead capture skipped: no webhook configured");
        Ok(())
    }
}

/// Credential provider backed by the loaded configuration
///
/// There is no interactive selection outside a browser; prompting logs
/// where the key is read from.
#[derive(Debug, Clone, Copy)]
pub struct ConfigCredentials {
    present: bool,
}

impl ConfigCredentials {
    /// Create provider reflecting whether a key was configured
    #[must_use]
    pub fn new(present: bool) -> Self {
        Self { present }
    }
}

#[async_trait]
impl CredentialProvider for ConfigCredentials {
    fn has_credential(&self) -> bool {
        self.present
    }

    async fn prompt_credential(&self) {
        tracing::warn!(
            "model credential missing or rejected; set {} (or {}) and retry",
            crate::config::ENV_API_KEY,
            crate::config::ENV_API_KEY_FALLBACK
        );
    }
}
