//! Wiki content model: spaces, pages, attachments and their versions.
//!
//! These are plain values produced by a [`ContentStore`](crate::store::ContentStore)
//! and consumed by the index, classifier and report writers. None of them
//! carries page bodies; bodies are fetched, scanned and dropped one at a time.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::core::CanonicalName;
use crate::utils::date::DateTimeUtc;

/// Opaque page identifier as issued by the wiki.
///
/// Ids are numeric strings in practice but are never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageId(Arc<str>);

impl PageId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A top-level container of pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Space {
    pub key: String,
    pub name: String,
}

impl Space {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// A document within a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub space_key: String,
    /// Web UI path relative to the site base (e.g. `/spaces/DOC/pages/1/Home`)
    pub webui: Option<String>,
}

impl Page {
    pub fn new(id: impl AsRef<str>, title: impl Into<String>, space_key: impl Into<String>) -> Self {
        Self {
            id: PageId::new(id),
            title: title.into(),
            space_key: space_key.into(),
            webui: None,
        }
    }
}

/// Pages of one space, addressable by id.
#[derive(Debug, Default)]
pub struct PageDirectory {
    pages: Vec<Page>,
    by_id: FxHashMap<PageId, usize>,
}

impl PageDirectory {
    pub fn new(pages: Vec<Page>) -> Self {
        let by_id = pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self { pages, by_id }
    }

    pub fn get(&self, id: &PageId) -> Option<&Page> {
        self.by_id.get(id).map(|&i| &self.pages[i])
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// A file attached to exactly one owning page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Attachment content id (used by the delete endpoint)
    pub id: String,
    pub owner: PageId,
    /// Current filename
    pub filename: String,
    /// Current version size in bytes
    pub size: u64,
    pub media_type: Option<String>,
    /// Download path relative to the site base
    pub download: Option<String>,
}

impl Attachment {
    pub fn new(id: impl Into<String>, owner: impl AsRef<str>, filename: impl Into<String>, size: u64) -> Self {
        Self {
            id: id.into(),
            owner: PageId::new(owner),
            filename: filename.into(),
            size,
            media_type: None,
            download: None,
        }
    }

    #[inline]
    pub fn canonical_name(&self) -> CanonicalName {
        CanonicalName::new(&self.filename)
    }
}

/// One historical revision of an attachment.
///
/// Each version carries its own filename because renames are versioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentVersion {
    pub number: u32,
    pub filename: String,
    pub size: Option<u64>,
    pub created: Option<DateTimeUtc>,
}

impl AttachmentVersion {
    pub fn new(number: u32, filename: impl Into<String>) -> Self {
        Self {
            number,
            filename: filename.into(),
            size: None,
            created: None,
        }
    }
}

/// An attachment with its version history.
///
/// Invariant: `versions` is sorted by ascending number, has no duplicate
/// numbers, and is never empty (the current revision is always present).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedAttachment {
    pub attachment: Attachment,
    pub versions: Vec<AttachmentVersion>,
}

impl VersionedAttachment {
    /// Combine an attachment with its fetched history, restoring the invariant.
    ///
    /// `current` is the version number of the live revision; it is added
    /// when the history does not already contain it.
    pub fn new(attachment: Attachment, current: u32, mut versions: Vec<AttachmentVersion>) -> Self {
        if !versions.iter().any(|v| v.number == current) {
            versions.push(AttachmentVersion::new(current, attachment.filename.clone()));
        }
        versions.sort_by_key(|v| v.number);
        versions.dedup_by_key(|v| v.number);
        Self {
            attachment,
            versions,
        }
    }

    /// Attachment without fetched history: a single current revision.
    pub fn current_only(attachment: Attachment, current: u32) -> Self {
        Self::new(attachment, current, Vec::new())
    }

    /// Canonical names across all versions, deduplicated.
    pub fn canonical_names(&self) -> Vec<CanonicalName> {
        let mut names: Vec<_> = std::iter::once(self.attachment.canonical_name())
            .chain(self.versions.iter().map(|v| CanonicalName::new(&v.filename)))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Most recent version timestamp, if the store reported one.
    pub fn last_modified(&self) -> Option<DateTimeUtc> {
        self.versions.iter().filter_map(|v| v.created).max()
    }

    #[inline]
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }
}
