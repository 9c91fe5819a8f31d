//! Editor session
//!
//! Coordinates one active site through its lifecycle:
//! load or generate, direct and AI edits, debounced persistence,
//! single-level undo and publishing.
//!
//! Direct edits apply immediately and schedule a trailing-debounced write;
//! only the state at the end of a burst is written. AI edits, undo and
//! the first save after generation persist immediately and supersede any
//! pending debounce. Writes are serialized, so the last write always
//! carries the latest document.

mod state;

pub use state::{allowed_transitions, validate_transition, EditorState, Phase};

use crate::cancel::CancelToken;
use crate::collaborators::{ConfigCredentials, CredentialProvider, Deployment, Publisher, UnconfiguredPublisher};
use crate::error::{EditError, EditorError, GenerationError, StoreError};
use crate::generator::ContentGenerator;
use crate::merger::EditMerger;
use crate::store::SiteStore;
use parking_lot::Mutex;
use sitegen_document::{DirectEdit, Document, GeneratorInputs, SiteId, SiteInstance};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default trailing debounce for direct edits
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

#[derive(Debug)]
struct Inner {
    state: EditorState,
    active: Option<SiteInstance>,
    undo: Option<Document>,
    last_instruction: Option<String>,
    /// Active site has changes not yet handed to the store
    dirty: bool,
    /// Bumped whenever a model request starts or is abandoned
    epoch: u64,
    in_flight: Option<CancelToken>,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: EditorState::Empty,
            active: None,
            undo: None,
            last_instruction: None,
            dirty: false,
            epoch: 0,
            in_flight: None,
        }
    }

    fn transition(&mut self, to: EditorState) -> Result<(), EditorError> {
        let (from, next) = (self.state.phase(), to.phase());
        validate_transition(from, next)?;
        tracing::debug!(%from, to = %next, "editor transition");
        self.state = to;
        Ok(())
    }

    /// Active site is present and not locked by an AI edit
    fn require_site(&self) -> Result<(), EditorError> {
        match self.state.phase() {
            Phase::AiEditing => Err(EditorError::Busy),
            Phase::Ready | Phase::Saving | Phase::AiEditFailed if self.active.is_some() => Ok(()),
            _ => Err(EditorError::NoActiveSite),
        }
    }

    fn begin_request(&mut self, to: EditorState) -> Result<(u64, CancelToken), EditorError> {
        self.transition(to)?;
        self.epoch += 1;
        let token = CancelToken::new();
        self.in_flight = Some(token.clone());
        Ok((self.epoch, token))
    }

    /// Check if the request started at `epoch` may still apply its result
    fn owns(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.in_flight.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn abandon_request(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.epoch += 1;
    }
}

struct Shared {
    store: Arc<dyn SiteStore>,
    inner: Mutex<Inner>,
    persist_seq: AtomicU64,
    write_lock: tokio::sync::Mutex<()>,
}

impl Shared {
    fn next_seq(&self) -> u64 {
        self.persist_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Write the latest snapshot of the active site
    async fn persist(&self) -> Result<(), StoreError> {
        let _write = self.write_lock.lock().await;
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.dirty = false;
            inner.active.clone()
        };
        let Some(site) = snapshot else {
            return Ok(());
        };

        let result = self.store.put(&site).await;
        if let Err(e) = &result {
            tracing::error!(id = %site.id, "save failed: {}", e);
            self.inner.lock().dirty = true;
        }
        result
    }

    /// Persist, then settle `Saving` into `Ready` unless a newer write is queued
    async fn persist_and_settle(&self, seq: u64) -> Result<(), StoreError> {
        let result = self.persist().await;
        let mut inner = self.inner.lock();
        if self.persist_seq.load(Ordering::SeqCst) == seq && inner.state == EditorState::Saving {
            inner.transition(EditorState::Ready).ok();
        }
        result
    }
}

/// One user's editing session over a single active site
pub struct EditorSession {
    shared: Arc<Shared>,
    generator: Arc<ContentGenerator>,
    merger: Arc<EditMerger>,
    publisher: Arc<dyn Publisher>,
    credentials: Arc<dyn CredentialProvider>,
    debounce: Duration,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("state", &self.state())
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Create session; publishing is unconfigured and the credential is
    /// assumed present until overridden
    #[must_use]
    pub fn new(
        store: Arc<dyn SiteStore>,
        generator: Arc<ContentGenerator>,
        merger: Arc<EditMerger>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                inner: Mutex::new(Inner::new()),
                persist_seq: AtomicU64::new(0),
                write_lock: tokio::sync::Mutex::new(()),
            }),
            generator,
            merger,
            publisher: Arc::new(UnconfiguredPublisher),
            credentials: Arc::new(ConfigCredentials::new(true)),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// With publisher
    #[inline]
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// With credential provider
    #[inline]
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    /// With debounce interval
    #[inline]
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> EditorState {
        self.shared.inner.lock().state.clone()
    }

    /// Snapshot of the active site
    #[must_use]
    pub fn active(&self) -> Option<SiteInstance> {
        self.shared.inner.lock().active.clone()
    }

    /// Snapshot of the active document
    #[must_use]
    pub fn document(&self) -> Option<Document> {
        self.shared.inner.lock().active.as_ref().map(|s| s.data.clone())
    }

    /// Check if an undo is available
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.shared.inner.lock().undo.is_some()
    }

    /// Instruction of the last applied AI edit
    #[must_use]
    pub fn last_instruction(&self) -> Option<String> {
        self.shared.inner.lock().last_instruction.clone()
    }

    /// Check if the active site has unsaved changes
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.inner.lock().dirty
    }

    /// Restore a stored site
    ///
    /// # Errors
    /// - `EditorError::InvalidTransition` unless the session is empty
    /// - `EditorError::NotFound` if the store has no such site
    pub async fn load(&self, id: SiteId) -> Result<(), EditorError> {
        {
            let inner = self.shared.inner.lock();
            validate_transition(inner.state.phase(), Phase::Ready)?;
        }
        let site = self
            .shared
            .store
            .get(id)
            .await?
            .ok_or(EditorError::NotFound(id))?;

        let mut inner = self.shared.inner.lock();
        inner.transition(EditorState::Ready)?;
        inner.active = Some(site);
        inner.undo = None;
        inner.last_instruction = None;
        inner.dirty = false;
        tracing::info!(%id, "site loaded");
        Ok(())
    }

    /// Generate a new site and make it active
    ///
    /// The first save happens before this returns.
    ///
    /// # Errors
    /// - `EditorError::Generation` on any generation failure (state
    ///   `GenerationFailed` unless the input was rejected up front)
    /// - `EditorError::InvalidTransition` if a site is already active
    /// - `EditorError::Store` if the first save fails; the site stays active
    pub async fn generate(&self, inputs: GeneratorInputs) -> Result<SiteId, EditorError> {
        inputs.validate().map_err(GenerationError::from)?;

        let (epoch, token) = self
            .shared
            .inner
            .lock()
            .begin_request(EditorState::Generating)?;

        if !self.credentials.has_credential() {
            self.credentials.prompt_credential().await;
        }
        let result = self.generator.generate(&inputs, &token).await;
        if matches!(&result, Err(e) if e.is_credential_problem()) {
            self.credentials.prompt_credential().await;
        }

        let id = {
            let mut inner = self.shared.inner.lock();
            if !inner.owns(epoch) {
                return Err(GenerationError::Cancelled.into());
            }
            inner.in_flight = None;
            match result {
                Ok(document) => {
                    let site = SiteInstance::new(document);
                    let id = site.id;
                    inner.transition(EditorState::Ready)?;
                    inner.active = Some(site);
                    inner.undo = None;
                    inner.last_instruction = None;
                    inner.dirty = true;
                    id
                }
                Err(e) => {
                    tracing::error!("generation failed: {}", e);
                    inner.transition(EditorState::GenerationFailed {
                        message: e.to_string(),
                    })?;
                    return Err(e.into());
                }
            }
        };

        self.shared.next_seq();
        self.shared.persist().await?;
        tracing::info!(%id, "site created");
        Ok(id)
    }

    /// Apply a direct edit and schedule a debounced save
    ///
    /// # Errors
    /// - `EditorError::Busy` while an AI edit is pending
    /// - `EditorError::NoActiveSite` without an active site
    /// - `EditorError::Field` for a blank value or bad index
    pub fn apply_direct_edit(&self, edit: &DirectEdit) -> Result<(), EditorError> {
        {
            let mut inner = self.shared.inner.lock();
            inner.require_site()?;
            let site = inner.active.as_mut().ok_or(EditorError::NoActiveSite)?;
            edit.apply(&mut site.data)?;
            site.touch();
            inner.dirty = true;
            inner.transition(EditorState::Saving)?;
        }
        self.schedule_persist();
        Ok(())
    }

    fn schedule_persist(&self) {
        let seq = self.shared.next_seq();
        let shared = Arc::clone(&self.shared);
        let delay = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if shared.persist_seq.load(Ordering::SeqCst) != seq {
                return;
            }
            // failures are logged by persist and leave the session dirty
            let _ = shared.persist_and_settle(seq).await;
        });
    }

    /// Apply a natural-language edit through the merger
    ///
    /// On success the previous document becomes the undo target and the
    /// result is saved immediately. On failure the document is untouched
    /// and the instruction is kept in [`EditorState::AiEditFailed`].
    ///
    /// # Errors
    /// - `EditorError::Busy` while another AI edit is pending
    /// - `EditorError::NoActiveSite` without an active site
    /// - `EditorError::Edit` if the merge fails
    /// - `EditorError::Store` if the save fails; the edit stays applied
    pub async fn apply_ai_edit(&self, instruction: &str) -> Result<(), EditorError> {
        let instruction = instruction.trim().to_string();
        if instruction.is_empty() {
            return Err(EditError::InvalidInput("instruction is required".to_string()).into());
        }

        let (epoch, token, current) = {
            let mut inner = self.shared.inner.lock();
            inner.require_site()?;
            let current = inner
                .active
                .as_ref()
                .map(|s| s.data.clone())
                .ok_or(EditorError::NoActiveSite)?;
            let (epoch, token) = inner.begin_request(EditorState::AiEditing)?;
            (epoch, token, current)
        };

        let result = self.merger.apply_edit(&instruction, &current, &token).await;

        {
            let mut inner = self.shared.inner.lock();
            if !inner.owns(epoch) {
                return Err(EditError::Cancelled.into());
            }
            inner.in_flight = None;
            match result {
                Ok(edited) => {
                    let site = inner.active.as_mut().ok_or(EditorError::NoActiveSite)?;
                    let previous = std::mem::replace(&mut site.data, edited);
                    site.touch();
                    inner.undo = Some(previous);
                    inner.last_instruction = Some(instruction);
                    inner.dirty = true;
                    inner.transition(EditorState::Saving)?;
                }
                Err(e) => {
                    tracing::warn!(%instruction, "AI edit failed: {}", e);
                    inner.transition(EditorState::AiEditFailed {
                        instruction,
                        message: e.to_string(),
                    })?;
                    return Err(e.into());
                }
            }
        }

        let seq = self.shared.next_seq();
        self.shared.persist_and_settle(seq).await?;
        Ok(())
    }

    /// Re-run the instruction of the last failed AI edit
    ///
    /// # Errors
    /// `EditorError::InvalidTransition` unless the last AI edit failed,
    /// otherwise as [`Self::apply_ai_edit`]
    pub async fn retry_ai_edit(&self) -> Result<(), EditorError> {
        let instruction = match &self.shared.inner.lock().state {
            EditorState::AiEditFailed { instruction, .. } => instruction.clone(),
            other => {
                return Err(EditorError::InvalidTransition {
                    from: other.phase(),
                    to: Phase::AiEditing,
                })
            }
        };
        self.apply_ai_edit(&instruction).await
    }

    /// Clear a failure state: `AiEditFailed` returns to `Ready`,
    /// `GenerationFailed` to `Empty`
    ///
    /// # Errors
    /// `EditorError::InvalidTransition` from any other state
    pub fn dismiss_failure(&self) -> Result<(), EditorError> {
        let mut inner = self.shared.inner.lock();
        let to = match inner.state.phase() {
            Phase::AiEditFailed => EditorState::Ready,
            Phase::GenerationFailed => EditorState::Empty,
            from => {
                return Err(EditorError::InvalidTransition {
                    from,
                    to: Phase::Ready,
                })
            }
        };
        inner.transition(to)
    }

    /// Restore the document that preceded the last AI edit
    ///
    /// # Errors
    /// - `EditorError::NothingToUndo` if the undo slot is empty
    /// - `EditorError::Busy` / `EditorError::NoActiveSite` as for edits
    /// - `EditorError::Store` if the save fails
    pub async fn undo(&self) -> Result<(), EditorError> {
        {
            let mut inner = self.shared.inner.lock();
            inner.require_site()?;
            let previous = inner.undo.take().ok_or(EditorError::NothingToUndo)?;
            let site = inner.active.as_mut().ok_or(EditorError::NoActiveSite)?;
            site.replace(previous);
            inner.last_instruction = None;
            inner.dirty = true;
            inner.transition(EditorState::Saving)?;
        }
        tracing::info!("AI edit undone");

        let seq = self.shared.next_seq();
        self.shared.persist_and_settle(seq).await?;
        Ok(())
    }

    /// Write pending changes now, cancelling any scheduled debounce
    ///
    /// # Errors
    /// `EditorError::Store` if the write fails
    pub async fn flush(&self) -> Result<(), EditorError> {
        if !self.is_dirty() {
            return Ok(());
        }
        let seq = self.shared.next_seq();
        self.shared.persist_and_settle(seq).await?;
        Ok(())
    }

    /// Abandon the active site and return to `Empty`
    ///
    /// Pending writes are flushed first and any in-flight model request
    /// is cancelled; its result will never be applied. The site stays in
    /// the store.
    ///
    /// # Errors
    /// - `EditorError::ConfirmationRequired` unless `confirmed`
    /// - `EditorError::Store` if the flush fails; nothing is reset
    pub async fn reset(&self, confirmed: bool) -> Result<(), EditorError> {
        if !confirmed {
            return Err(EditorError::ConfirmationRequired);
        }
        self.flush().await?;

        let mut inner = self.shared.inner.lock();
        inner.abandon_request();
        if inner.state != EditorState::Empty {
            inner.transition(EditorState::Empty)?;
        }
        inner.active = None;
        inner.undo = None;
        inner.last_instruction = None;
        inner.dirty = false;
        self.shared.next_seq();
        tracing::info!("session reset");
        Ok(())
    }

    /// Flush and deploy the active document as `site-{id}`
    ///
    /// # Errors
    /// - `EditorError::Busy` / `EditorError::NoActiveSite` as for edits
    /// - `EditorError::Store` if the flush fails
    /// - `EditorError::Publish` for every deployment failure
    pub async fn publish(&self) -> Result<Deployment, EditorError> {
        self.shared.inner.lock().require_site()?;
        self.flush().await?;

        let (document, project) = {
            let inner = self.shared.inner.lock();
            let site = inner.active.as_ref().ok_or(EditorError::NoActiveSite)?;
            (site.data.clone(), site.project_name())
        };

        tracing::info!(%project, "publishing site");
        match self.publisher.deploy(&document, &project).await {
            Ok(deployment) => {
                tracing::info!(%project, url = %deployment.url, "site published");
                Ok(deployment)
            }
            Err(e) => {
                tracing::error!(%project, "publish failed: {}", e);
                Err(e.into())
            }
        }
    }
}
