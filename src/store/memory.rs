//! In-memory content store.
//!
//! Holds a fixed snapshot of spaces, pages, bodies and attachments. Used by
//! tests and by offline runs. Individual spaces or pages can be marked as
//! failing to exercise error paths.

use rustc_hash::{FxHashMap, FxHashSet};

use super::{ContentStore, FetchError, Listing};
use crate::model::{Attachment, AttachmentVersion, Page, PageId, Space, VersionedAttachment};

#[derive(Debug, Default)]
pub struct MemoryStore {
    base_url: String,
    spaces: Vec<Space>,
    pages: FxHashMap<String, Vec<Page>>,
    bodies: FxHashMap<PageId, String>,
    attachments: FxHashMap<PageId, Vec<VersionedAttachment>>,
    failing_spaces: FxHashSet<String>,
    failing_bodies: FxHashSet<PageId>,
    spaces_unavailable: bool,
}

impl MemoryStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn add_space(&mut self, key: &str, name: &str) -> &mut Self {
        self.spaces.push(Space::new(key, name));
        self.pages.entry(key.to_string()).or_default();
        self
    }

    /// Add a page with a body. The space must have been added.
    pub fn add_page(&mut self, space: &str, id: &str, title: &str, body: &str) -> &mut Self {
        let mut page = Page::new(id, title, space);
        page.webui = Some(format!("/spaces/{space}/pages/{id}"));
        self.bodies.insert(page.id.clone(), body.to_string());
        self.pages.entry(space.to_string()).or_default().push(page);
        self
    }

    /// Add a current-only attachment.
    pub fn add_attachment(&mut self, owner: &str, id: &str, filename: &str, size: u64) -> &mut Self {
        let attachment = Attachment::new(id, owner, filename, size);
        self.push_attachment(VersionedAttachment::current_only(attachment, 1))
    }

    /// Add an attachment whose earlier versions had other filenames.
    /// `history` is ordered oldest first; the last entry is the current name.
    pub fn add_renamed_attachment(&mut self, owner: &str, id: &str, history: &[&str], size: u64) -> &mut Self {
        let current = history.last().copied().unwrap_or_default();
        let versions: Vec<_> = (1u32..)
            .zip(history)
            .map(|(n, name)| AttachmentVersion::new(n, *name))
            .collect();
        let number = versions.last().map_or(1, |v| v.number);
        let attachment = Attachment::new(id, owner, current, size);
        self.push_attachment(VersionedAttachment::new(attachment, number, versions))
    }

    /// Simulate a page deleted between listing and body retrieval.
    pub fn remove_body(&mut self, page: &str) -> &mut Self {
        self.bodies.remove(&PageId::new(page));
        self
    }

    /// Every listing call for this space fails.
    pub fn fail_space(&mut self, key: &str) -> &mut Self {
        self.failing_spaces.insert(key.to_string());
        self
    }

    /// Body retrieval for this page fails.
    pub fn fail_body(&mut self, page: &str) -> &mut Self {
        self.failing_bodies.insert(PageId::new(page));
        self
    }

    /// The root space listing fails.
    pub fn fail_spaces_listing(&mut self) -> &mut Self {
        self.spaces_unavailable = true;
        self
    }

    fn push_attachment(&mut self, item: VersionedAttachment) -> &mut Self {
        self.attachments
            .entry(item.attachment.owner.clone())
            .or_default()
            .push(item);
        self
    }

    fn unavailable(&self, what: String) -> FetchError {
        FetchError::RetriesExhausted {
            url: format!("{}{}", self.base_url, what),
            attempts: 1,
            last: "unavailable".to_string(),
        }
    }
}

impl ContentStore for MemoryStore {
    fn list_spaces(&self) -> Listing<'_, Space> {
        if self.spaces_unavailable {
            return Box::new(std::iter::once(Err(self.unavailable("/rest/api/space".into()))));
        }
        Box::new(self.spaces.iter().cloned().map(Ok))
    }

    fn list_pages<'a>(&'a self, space: &'a Space) -> Listing<'a, Page> {
        if self.failing_spaces.contains(&space.key) {
            return Box::new(std::iter::once(Err(
                self.unavailable(format!("/rest/api/content?spaceKey={}", space.key))
            )));
        }
        let pages = self.pages.get(&space.key).map(Vec::as_slice).unwrap_or_default();
        Box::new(pages.iter().cloned().map(Ok))
    }

    fn list_attachments(&self, page: &Page) -> Result<Vec<VersionedAttachment>, FetchError> {
        Ok(self.attachments.get(&page.id).cloned().unwrap_or_default())
    }

    fn get_body(&self, page: &Page) -> Result<Option<String>, FetchError> {
        if self.failing_bodies.contains(&page.id) {
            return Err(self.unavailable(format!("/rest/api/content/{}", page.id)));
        }
        Ok(self.bodies.get(&page.id).cloned())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_round_trip() {
        let mut store = MemoryStore::new("https://wiki.example/");
        store
            .add_space("DOC", "Docs")
            .add_page("DOC", "1", "Home", "<p/>")
            .add_attachment("1", "att1", "a.png", 10);

        let space = store.list_spaces().next().unwrap().unwrap();
        let pages: Vec<_> = store.list_pages(&space).collect::<Result<_, _>>().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(store.get_body(&pages[0]).unwrap().as_deref(), Some("<p/>"));
        assert_eq!(store.list_attachments(&pages[0]).unwrap().len(), 1);
        assert_eq!(store.base_url(), "https://wiki.example");
    }

    #[test]
    fn test_renamed_attachment_history() {
        let mut store = MemoryStore::new("https://wiki.example");
        store
            .add_space("DOC", "Docs")
            .add_page("DOC", "1", "Home", "")
            .add_renamed_attachment("1", "att1", &["old.png", "new.png"], 10);
        let page = Page::new("1", "Home", "DOC");
        let items = store.list_attachments(&page).unwrap();
        assert_eq!(items[0].attachment.filename, "new.png");
        assert_eq!(items[0].versions.len(), 2);
        assert_eq!(items[0].versions[0].filename, "old.png");
    }

    #[test]
    fn test_failure_injection() {
        let mut store = MemoryStore::new("https://wiki.example");
        store.add_space("DOC", "Docs").fail_space("DOC").add_page("DOC", "1", "Home", "");
        let space = Space::new("DOC", "Docs");
        assert!(store.list_pages(&space).next().unwrap().is_err());

        store.fail_body("1");
        assert!(store.get_body(&Page::new("1", "Home", "DOC")).is_err());
    }
}
