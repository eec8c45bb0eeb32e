//! Usage verdict for a single attachment.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::CanonicalName;
use crate::index::ReferenceIndex;
use crate::model::{PageDirectory, PageId, VersionedAttachment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Used,
    Unreferenced,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Used => "used",
            Self::Unreferenced => "unreferenced",
        }
    }
}

/// A page as shown in report rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub id: PageId,
    pub title: String,
    pub webui: Option<String>,
}

impl PageLink {
    fn lookup(id: &PageId, pages: &PageDirectory) -> Self {
        match pages.get(id) {
            Some(page) => Self {
                id: page.id.clone(),
                title: page.title.clone(),
                webui: page.webui.clone(),
            },
            None => Self {
                id: id.clone(),
                title: format!("page {id}"),
                webui: None,
            },
        }
    }
}

/// Which references justified the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub owner: PageLink,
    /// Displayed inline on the owning page
    pub embedded: bool,
    /// Linked from the owning page
    pub linked_on_owner: bool,
    /// Other pages in the space linking to it, ordered by page id
    pub linked_from: Vec<PageLink>,
    /// Version numbers whose filename was referenced
    pub versions: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub verdict: Verdict,
    pub evidence: Evidence,
}

/// Decide whether an attachment is used.
///
/// Every version's filename is checked, so references made before a rename
/// still count. Total function: anything without a qualifying reference is
/// `Unreferenced`.
pub fn classify(item: &VersionedAttachment, index: &ReferenceIndex, pages: &PageDirectory) -> Usage {
    let owner = &item.attachment.owner;
    let mut embedded = false;
    let mut linked_on_owner = false;
    let mut others: BTreeSet<&PageId> = BTreeSet::new();
    let mut versions: BTreeSet<u32> = BTreeSet::new();

    for name in item.canonical_names() {
        let Some(sites) = index.sites(owner, &name) else {
            continue;
        };
        let on_owner = sites.embedded_by.contains(owner);
        if !on_owner && sites.linked_by.is_empty() {
            continue;
        }
        embedded |= on_owner;
        linked_on_owner |= sites.linked_by.contains(owner);
        others.extend(sites.linked_by.iter().filter(|p| *p != owner));
        versions.extend(
            item.versions
                .iter()
                .filter(|v| CanonicalName::new(&v.filename) == name)
                .map(|v| v.number),
        );
    }

    let verdict = if embedded || linked_on_owner || !others.is_empty() {
        Verdict::Used
    } else {
        Verdict::Unreferenced
    };

    Usage {
        verdict,
        evidence: Evidence {
            owner: PageLink::lookup(owner, pages),
            embedded,
            linked_on_owner,
            linked_from: others.into_iter().map(|p| PageLink::lookup(p, pages)).collect(),
            versions: versions.into_iter().collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, AttachmentVersion, Page};

    fn setup() -> (PageDirectory, Vec<Page>) {
        let pages = vec![
            Page::new("1", "Home", "DOC"),
            Page::new("2", "Notes", "DOC"),
            Page::new("3", "Archive", "DOC"),
        ];
        (PageDirectory::new(pages.clone()), pages)
    }

    fn item(owner: &str, file: &str) -> VersionedAttachment {
        VersionedAttachment::current_only(Attachment::new("att", owner, file, 10), 1)
    }

    fn index(pages: &[Page], bodies: &[(&str, &str)]) -> ReferenceIndex {
        let mut index = ReferenceIndex::new("DOC", pages);
        for (id, body) in bodies {
            index.scan_body(&PageId::new(id), body).unwrap();
        }
        index
    }

    #[test]
    fn test_embedded_on_owner_is_used() {
        let (dir, pages) = setup();
        let idx = index(&pages, &[("1", r#"<ac:image><ri:attachment ri:filename="a.png"/></ac:image>"#)]);
        let usage = classify(&item("1", "a.png"), &idx, &dir);
        assert_eq!(usage.verdict, Verdict::Used);
        assert!(usage.evidence.embedded);
        assert!(!usage.evidence.linked_on_owner);
        assert_eq!(usage.evidence.owner.title, "Home");
    }

    #[test]
    fn test_no_references_is_unreferenced() {
        let (dir, pages) = setup();
        let idx = index(&pages, &[("1", "<p>nothing here</p>")]);
        let usage = classify(&item("1", "a.png"), &idx, &dir);
        assert_eq!(usage.verdict, Verdict::Unreferenced);
        assert!(usage.evidence.linked_from.is_empty());
    }

    #[test]
    fn test_embedded_elsewhere_only_is_unreferenced() {
        let (dir, pages) = setup();
        let idx = index(&pages, &[("2", r#"<img src="/download/attachments/1/a.png"/>"#)]);
        let usage = classify(&item("1", "a.png"), &idx, &dir);
        assert_eq!(usage.verdict, Verdict::Unreferenced);
    }

    #[test]
    fn test_linked_from_others_sorted_by_id() {
        let (dir, pages) = setup();
        let link = r#"<a href="/download/attachments/1/a.png">a</a>"#;
        let idx = index(&pages, &[("3", link), ("2", link)]);
        let usage = classify(&item("1", "a.png"), &idx, &dir);
        assert_eq!(usage.verdict, Verdict::Used);
        let ids: Vec<_> = usage.evidence.linked_from.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(usage.evidence.linked_from[1].title, "Archive");
    }

    #[test]
    fn test_same_name_on_other_owner_does_not_count() {
        let (dir, pages) = setup();
        let idx = index(&pages, &[("2", r#"<ac:image><ri:attachment ri:filename="logo.png"/></ac:image>"#)]);
        let usage = classify(&item("1", "logo.png"), &idx, &dir);
        assert_eq!(usage.verdict, Verdict::Unreferenced);
    }

    #[test]
    fn test_old_version_name_counts() {
        let (dir, pages) = setup();
        let idx = index(&pages, &[("1", r#"<ac:link><ri:attachment ri:filename="draft.pdf"/></ac:link>"#)]);
        let att = Attachment::new("att", "1", "final.pdf", 10);
        let versioned = VersionedAttachment::new(
            att,
            2,
            vec![AttachmentVersion::new(1, "draft.pdf"), AttachmentVersion::new(2, "final.pdf")],
        );
        let usage = classify(&versioned, &idx, &dir);
        assert_eq!(usage.verdict, Verdict::Used);
        assert!(usage.evidence.linked_on_owner);
        assert_eq!(usage.evidence.versions, vec![1]);
    }

    #[test]
    fn test_missing_owner_page_gets_placeholder_title() {
        let (dir, pages) = setup();
        let idx = index(&pages, &[]);
        let usage = classify(&item("99", "a.png"), &idx, &dir);
        assert_eq!(usage.evidence.owner.title, "page 99");
        assert_eq!(usage.verdict, Verdict::Unreferenced);
    }
}
