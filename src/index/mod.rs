//! Per-space reference index.
//!
//! Maps each `(owner page, canonical filename)` to the pages that embed it
//! and the pages that link to it. Built once per space from scanned bodies
//! and dropped together with the space.
//!
//! Recording rules:
//! - `embedded_by` only ever contains the owner itself (inline display of a
//!   foreign page's attachment does not keep that attachment alive)
//! - `linked_by` may contain any page of the space, including the owner
//! - References to owners that cannot be resolved in this space are ignored

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::core::CanonicalName;
use crate::debug;
use crate::model::{Page, PageId};
use crate::scan::{self, Owner, PageRefs, ScanError};

/// Index key: an attachment is identified by its owner and folded name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentKey {
    pub owner: PageId,
    pub name: CanonicalName,
}

impl AttachmentKey {
    pub fn new(owner: PageId, name: CanonicalName) -> Self {
        Self { owner, name }
    }
}

/// Pages referring to one attachment key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sites {
    pub embedded_by: BTreeSet<PageId>,
    pub linked_by: BTreeSet<PageId>,
}

/// Counters reported after a space has been indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub pages_scanned: usize,
    pub pages_failed: usize,
    pub references: usize,
}

#[derive(Debug, Default)]
pub struct ReferenceIndex {
    space_key: String,
    /// Folded page title → page id, for `ri:page` owner hints
    titles: FxHashMap<String, PageId>,
    /// Attachment → referring pages
    references: FxHashMap<AttachmentKey, Sites>,
    stats: IndexStats,
}

impl ReferenceIndex {
    /// Empty index for a space whose pages are known.
    pub fn new(space_key: &str, pages: &[Page]) -> Self {
        let titles = pages
            .iter()
            .map(|p| (fold_title(&p.title), p.id.clone()))
            .collect();
        Self {
            space_key: space_key.to_string(),
            titles,
            ..Self::default()
        }
    }

    /// Scan one body and record its references.
    ///
    /// A body that fails to scan contributes nothing; the scan either
    /// succeeds as a whole or leaves the index untouched. Each page is
    /// expected to be scanned once.
    pub fn scan_body(&mut self, page: &PageId, body: &str) -> Result<usize, ScanError> {
        match scan::scan_page(page, body) {
            Ok(refs) => {
                self.stats.pages_scanned += 1;
                Ok(self.record(page, &refs))
            }
            Err(e) => {
                self.stats.pages_failed += 1;
                Err(e)
            }
        }
    }

    /// Record the references of one page. Returns the number of references
    /// kept after owner resolution.
    fn record(&mut self, from: &PageId, refs: &PageRefs) -> usize {
        let mut kept = 0;

        for r in &refs.embedded {
            let Some(owner) = self.resolve(&r.owner) else {
                continue;
            };
            if owner != *from {
                debug!("audit"; "page {} shows {} of page {}: not counted", from, r.name, owner);
                continue;
            }
            self.references
                .entry(AttachmentKey::new(owner, r.name.clone()))
                .or_default()
                .embedded_by
                .insert(from.clone());
            kept += 1;
        }

        for r in &refs.linked {
            let Some(owner) = self.resolve(&r.owner) else {
                continue;
            };
            self.references
                .entry(AttachmentKey::new(owner, r.name.clone()))
                .or_default()
                .linked_by
                .insert(from.clone());
            kept += 1;
        }

        self.stats.references += kept;
        kept
    }

    /// Resolve an owner hint to a page of this space.
    ///
    /// Title hints naming another space, or a title with no page here,
    /// resolve to nothing.
    pub fn resolve(&self, owner: &Owner) -> Option<PageId> {
        match owner {
            Owner::Page { id } => Some(id.clone()),
            Owner::Titled { title, space_key } => {
                if let Some(key) = space_key
                    && !key.eq_ignore_ascii_case(&self.space_key)
                {
                    return None;
                }
                self.titles.get(&fold_title(title)).cloned()
            }
        }
    }

    /// Referring pages for one attachment name under one owner.
    pub fn sites(&self, owner: &PageId, name: &CanonicalName) -> Option<&Sites> {
        self.references.get(&AttachmentKey::new(owner.clone(), name.clone()))
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Number of distinct attachment keys referenced.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&AttachmentKey, &Sites)> {
        self.references.iter()
    }
}

fn fold_title(title: &str) -> String {
    title.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn pages() -> Vec<Page> {
        vec![
            Page::new("1", "Home", "DOC"),
            Page::new("2", "Library", "DOC"),
            Page::new("3", "Notes", "DOC"),
        ]
    }

    fn id(s: &str) -> PageId {
        PageId::new(s)
    }

    fn name(s: &str) -> CanonicalName {
        CanonicalName::new(s)
    }

    fn snapshot(index: &ReferenceIndex) -> BTreeMap<AttachmentKey, Sites> {
        index.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    #[test]
    fn test_embedded_on_owner() {
        let mut index = ReferenceIndex::new("DOC", &pages());
        index
            .scan_body(&id("1"), r#"<ac:image><ri:attachment ri:filename="a.png"/></ac:image>"#)
            .unwrap();

        let sites = index.sites(&id("1"), &name("A.png")).unwrap();
        assert!(sites.embedded_by.contains(&id("1")));
        assert!(sites.linked_by.is_empty());
    }

    #[test]
    fn test_foreign_embed_ignored() {
        let mut index = ReferenceIndex::new("DOC", &pages());
        // page 3 displays page 2's attachment via an img URL
        index
            .scan_body(&id("3"), r#"<img src="/download/attachments/2/shared.png"/>"#)
            .unwrap();
        assert!(index.sites(&id("2"), &name("shared.png")).is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_link_from_other_page_by_title() {
        let mut index = ReferenceIndex::new("DOC", &pages());
        let body = r#"<ac:link><ri:attachment ri:filename="guide.pdf"><ri:page ri:content-title="library" /></ri:attachment></ac:link>"#;
        index.scan_body(&id("3"), body).unwrap();

        let sites = index.sites(&id("2"), &name("guide.pdf")).unwrap();
        assert_eq!(sites.linked_by.iter().collect::<Vec<_>>(), vec![&id("3")]);
    }

    #[test]
    fn test_cross_space_and_unknown_titles_ignored() {
        let mut index = ReferenceIndex::new("DOC", &pages());
        let body = r#"
            <ac:link><ri:attachment ri:filename="x.pdf"><ri:page ri:content-title="Library" ri:space-key="OPS"/></ri:attachment></ac:link>
            <ac:link><ri:attachment ri:filename="y.pdf"><ri:page ri:content-title="Missing"/></ri:attachment></ac:link>"#;
        assert_eq!(index.scan_body(&id("3"), body).unwrap(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_self_link_is_recorded() {
        let mut index = ReferenceIndex::new("DOC", &pages());
        index
            .scan_body(&id("1"), r#"<ac:link><ri:attachment ri:filename="a.pdf"/></ac:link>"#)
            .unwrap();
        let sites = index.sites(&id("1"), &name("a.pdf")).unwrap();
        assert!(sites.linked_by.contains(&id("1")));
    }

    #[test]
    fn test_blog_post_owner_resolves_by_title() {
        let mut pages = pages();
        pages.push(Page::new("9", "News", "DOC"));
        let mut index = ReferenceIndex::new("DOC", &pages);
        let body = r#"<ac:link><ri:attachment ri:filename="deck.pdf"><ri:blog-post ri:content-title="News" ri:posting-day="2024/03/01"/></ri:attachment></ac:link>"#;
        assert_eq!(index.scan_body(&id("1"), body).unwrap(), 1);

        let sites = index.sites(&id("9"), &name("deck.pdf")).unwrap();
        assert!(sites.linked_by.contains(&id("1")));
        assert!(index.sites(&id("1"), &name("deck.pdf")).is_none());
    }

    #[test]
    fn test_unlisted_blog_post_is_ignored() {
        let mut index = ReferenceIndex::new("DOC", &pages());
        let body = r#"<ac:link><ri:attachment ri:filename="deck.pdf"><ri:blog-post ri:content-title="News"/></ri:attachment></ac:link>"#;
        assert_eq!(index.scan_body(&id("1"), body).unwrap(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_failed_scan_contributes_nothing() {
        let mut index = ReferenceIndex::new("DOC", &pages());
        assert!(index.scan_body(&id("1"), r#"<ac:link><ri:attachment ri:filename="a.pdf""#).is_err());
        assert!(index.is_empty());
        assert_eq!(index.stats().pages_failed, 1);
        assert_eq!(index.stats().pages_scanned, 0);
    }

    #[test]
    fn test_same_bodies_give_same_index() {
        let bodies = [
            ("1", r#"<ac:image><ri:attachment ri:filename="a.png"/></ac:image>"#),
            ("2", r#"<a href="/download/attachments/1/b.pdf">b</a>"#),
            ("3", r#"<p>broken <a href="x"#),
        ];
        let build = || {
            let mut index = ReferenceIndex::new("DOC", &pages());
            for (page, body) in bodies {
                let _ = index.scan_body(&id(page), body);
            }
            index
        };

        let first = build();
        let second = build();

        assert_eq!(snapshot(&first), snapshot(&second));
        assert_eq!(first.len(), 2);
        assert_eq!(first.stats(), second.stats());
        assert_eq!(first.stats().pages_failed, 1);
    }
}
