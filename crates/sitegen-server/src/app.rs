//! Component wiring from configuration

use crate::routes;
use sitegen_core::{
    ConfigCredentials, ConfigError, ContentGenerator, DirectoryStore, EditMerger, EditorSession,
    HttpPublisher, LeadSink, NoopLeadSink, Publisher, SiteGenConfig, StoreError,
    UnconfiguredPublisher, WebhookLeadSink,
};
use sitegen_document::{DocumentError, DocumentSchema};
use sitegen_model::{GeminiClient, ModelError};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// Startup failures
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Model client could not be built
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Document schema failed to compile
    #[error(transparent)]
    Schema(#[from] DocumentError),

    /// Store directory unusable
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bind address does not parse
    #[error("invalid bind address '{0}'")]
    BindAddr(String),
}

/// Fully wired components
pub struct App {
    config: SiteGenConfig,
    store: Arc<DirectoryStore>,
    generator: Arc<ContentGenerator>,
    merger: Arc<EditMerger>,
    publisher: Arc<dyn Publisher>,
    credentials: Arc<ConfigCredentials>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store.root())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Build every component from a validated configuration
    ///
    /// # Errors
    /// Any [`AppError`] raised while constructing a component
    pub async fn build(config: SiteGenConfig) -> Result<Self, AppError> {
        config.validate()?;
        let schema = Arc::new(DocumentSchema::new()?);
        let client = Arc::new(GeminiClient::new(config.model.clone())?);

        let lead: Arc<dyn LeadSink> = match &config.lead_webhook_url {
            Some(url) => Arc::new(WebhookLeadSink::new(url.clone(), config.lead_source.clone())),
            None => Arc::new(NoopLeadSink),
        };
        let publisher: Arc<dyn Publisher> = match &config.publish_url {
            Some(url) => Arc::new(HttpPublisher::new(url.clone())),
            None => Arc::new(UnconfiguredPublisher),
        };

        let generator = ContentGenerator::new(client.clone(), client.clone(), schema.clone())
            .with_lead_sink(lead)
            .with_placeholder_base(config.placeholder_base_url.clone());
        let merger = EditMerger::new(client, schema);
        let store = DirectoryStore::open(config.store_dir.clone()).await?;
        let credentials = Arc::new(ConfigCredentials::new(config.model.has_api_key()));

        tracing::info!(
            store = %store.root().display(),
            lead_capture = config.lead_webhook_url.is_some(),
            publishing = config.publish_url.is_some(),
            "components ready"
        );

        Ok(Self {
            config,
            store: Arc::new(store),
            generator: Arc::new(generator),
            merger: Arc::new(merger),
            publisher,
            credentials,
        })
    }

    /// Effective configuration
    #[must_use]
    pub fn config(&self) -> &SiteGenConfig {
        &self.config
    }

    /// Site store
    #[must_use]
    pub fn store(&self) -> &DirectoryStore {
        &self.store
    }

    /// Edit merger shared with the HTTP surface
    #[must_use]
    pub fn merger(&self) -> Arc<EditMerger> {
        Arc::clone(&self.merger)
    }

    /// New editor session over the shared components
    #[must_use]
    pub fn session(&self) -> EditorSession {
        EditorSession::new(
            self.store.clone(),
            Arc::clone(&self.generator),
            Arc::clone(&self.merger),
        )
        .with_publisher(Arc::clone(&self.publisher))
        .with_credentials(self.credentials.clone())
        .with_debounce(self.config.debounce())
    }

    /// Serve the HTTP surface until the process ends
    ///
    /// # Errors
    /// `AppError::BindAddr` if `bind` does not parse
    pub async fn serve(&self, bind: &str) -> Result<(), AppError> {
        let addr: SocketAddr = bind.parse().map_err(|_| AppError::BindAddr(bind.to_string()))?;
        tracing::info!(%addr, "serving /api/ai-edit");
        warp::serve(routes::ai_edit(self.merger())).run(addr).await;
        Ok(())
    }
}
