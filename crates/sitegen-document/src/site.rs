//! Persisted site records

use crate::document::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Opaque site identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub Ulid);

impl SiteId {
    /// Generate new site ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// A document plus its identity and save time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInstance {
    /// Stable identifier
    pub id: SiteId,
    /// Current content
    pub data: Document,
    /// Time of the last successful save
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_saved: DateTime<Utc>,
}

impl SiteInstance {
    /// Wrap a freshly generated document under a new id
    #[must_use]
    pub fn new(data: Document) -> Self {
        Self {
            id: SiteId::new(),
            data,
            last_saved: Utc::now(),
        }
    }

    /// Replace the document and refresh the save timestamp
    pub fn replace(&mut self, data: Document) {
        self.data = data;
        self.touch();
    }

    /// Refresh the save timestamp
    #[inline]
    pub fn touch(&mut self) {
        self.last_saved = Utc::now();
    }

    /// Project name handed to the publish collaborator
    #[must_use]
    pub fn project_name(&self) -> String {
        format!("site-{}", self.id.to_string().to_ascii_lowercase())
    }
}
