//! Local site store
//!
//! Key-value persistence of [`SiteInstance`] records keyed by [`SiteId`].
//! Writes are single-key upserts; the last writer wins.

use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use sitegen_document::{Document, SiteId, SiteInstance};
use std::path::{Path, PathBuf};

/// Site persistence
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Insert or replace the record for `site.id`
    async fn put(&self, site: &SiteInstance) -> Result<(), StoreError>;

    /// Fetch one record
    async fn get(&self, id: SiteId) -> Result<Option<SiteInstance>, StoreError>;

    /// Every record, oldest id first
    async fn get_all(&self) -> Result<Vec<SiteInstance>, StoreError>;

    /// Document projection of [`SiteStore::get_all`]
    async fn documents(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.get_all().await?.into_iter().map(|s| s.data).collect())
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    sites: DashMap<SiteId, SiteInstance>,
}

impl MemoryStore {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sites
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn put(&self, site: &SiteInstance) -> Result<(), StoreError> {
        self.sites.insert(site.id, site.clone());
        Ok(())
    }

    async fn get(&self, id: SiteId) -> Result<Option<SiteInstance>, StoreError> {
        Ok(self.sites.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_all(&self) -> Result<Vec<SiteInstance>, StoreError> {
        let mut all: Vec<SiteInstance> = self.sites.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }
}

/// One pretty-printed JSON file per site under a root directory
///
/// Each put writes `<id>.json.tmp` and renames it over `<id>.json`, so a
/// reader never observes a half-written record.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open (and create if needed) a store rooted at `root`
    ///
    /// # Errors
    /// `StoreError::Io` if the directory cannot be created
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        tracing::debug!(root = %root.display(), "opened site store");
        Ok(Self { root })
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: SiteId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    async fn read_record(path: &Path) -> Result<Option<SiteInstance>, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl SiteStore for DirectoryStore {
    async fn put(&self, site: &SiteInstance) -> Result<(), StoreError> {
        let path = self.record_path(site.id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(site)?;

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        tracing::debug!(id = %site.id, bytes = bytes.len(), "site persisted");
        Ok(())
    }

    async fn get(&self, id: SiteId) -> Result<Option<SiteInstance>, StoreError> {
        Self::read_record(&self.record_path(id)).await
    }

    async fn get_all(&self) -> Result<Vec<SiteInstance>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;

        let mut all = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.root, e))?
        {
            let path = entry.path();
            // skips `.json.tmp` leftovers and foreign files
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(".json"))
                .is_some_and(|stem| stem.parse::<SiteId>().is_ok());
            if !is_record {
                continue;
            }
            if let Some(site) = Self::read_record(&path).await? {
                all.push(site);
            }
        }
        all.sort_by_key(|s| s.id);
        Ok(all)
    }
}
