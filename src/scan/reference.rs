//! References extracted from a single page body.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::{AttachmentLink, CanonicalName};
use crate::model::PageId;

/// Which page a reference claims to own the attachment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Owner {
    /// Owner known by id (the scanned page itself, or a page named in a URL)
    Page { id: PageId },
    /// Owner named by title, optionally in another space
    Titled {
        title: String,
        space_key: Option<String>,
    },
}

impl Owner {
    #[inline]
    pub fn page(id: &PageId) -> Self {
        Self::Page { id: id.clone() }
    }
}

/// A reference to an attachment as found in markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AttachmentRef {
    pub owner: Owner,
    pub name: CanonicalName,
    /// Pinned version (`ri:version-at-save`, `?version=N`)
    pub version: Option<u32>,
}

impl AttachmentRef {
    pub fn new(owner: Owner, name: CanonicalName) -> Self {
        Self {
            owner,
            name,
            version: None,
        }
    }
}

impl From<AttachmentLink> for AttachmentRef {
    fn from(link: AttachmentLink) -> Self {
        Self {
            owner: Owner::Page { id: link.owner },
            name: link.name,
            version: link.version,
        }
    }
}

/// Everything one page body refers to, split by reference kind.
///
/// A reference that is both displayed inline and wrapped in a hyperlink
/// appears in both sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRefs {
    pub embedded: BTreeSet<AttachmentRef>,
    pub linked: BTreeSet<AttachmentRef>,
}

impl PageRefs {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.embedded.is_empty() && self.linked.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.embedded.len() + self.linked.len()
    }
}
