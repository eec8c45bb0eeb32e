//! Per-space analysis state.

use anyhow::{Context, Result};

use crate::index::ReferenceIndex;
use crate::model::{PageDirectory, Space};
use crate::store::ContentStore;
use crate::usage::{SpaceReport, UsageRow, aggregate, classify};
use crate::{debug, log};

/// Everything gathered for one space: its pages and the reference index.
///
/// Bodies are scanned as they arrive and dropped right away; only the index
/// outlives the scan. The context itself is consumed by [`SpaceContext::report`].
pub struct SpaceContext<'a> {
    space: &'a Space,
    pages: PageDirectory,
    index: ReferenceIndex,
}

impl<'a> SpaceContext<'a> {
    /// List pages, fetch every body and build the reference index.
    ///
    /// Fetch failures abort the space. Bodies that fail to parse only lose
    /// their own references.
    pub fn load<S: ContentStore + ?Sized>(store: &S, space: &'a Space) -> Result<Self> {
        let pages: Vec<_> = store
            .list_pages(space)
            .collect::<Result<_, _>>()
            .with_context(|| format!("failed to list pages of {}", space.key))?;
        debug!("audit"; "{}: {} pages", space.key, pages.len());

        let mut index = ReferenceIndex::new(&space.key, &pages);
        for page in &pages {
            let body = store
                .get_body(page)
                .with_context(|| format!("failed to fetch body of page {} ({})", page.id, page.title))?;

            let Some(body) = body else {
                debug!("audit"; "{}: page {} vanished before its body was read", space.key, page.id);
                continue;
            };

            if let Err(e) = index.scan_body(&page.id, &body) {
                log!("warning"; "{}: page {} ({}) not scanned: {}", space.key, page.id, page.title, e);
            }
        }

        Ok(Self {
            space,
            pages: PageDirectory::new(pages),
            index,
        })
    }

    /// Classify every attachment and summarize the space.
    pub fn report<S: ContentStore + ?Sized>(self, store: &S, top: usize) -> Result<SpaceReport> {
        let mut rows = Vec::new();
        for page in self.pages.pages() {
            let items = store
                .list_attachments(page)
                .with_context(|| format!("failed to list attachments of page {} ({})", page.id, page.title))?;
            for item in items {
                let usage = classify(&item, &self.index, &self.pages);
                rows.push(UsageRow { item, usage });
            }
        }

        Ok(aggregate(
            self.space.clone(),
            rows,
            top,
            self.pages.len(),
            self.index.stats(),
        ))
    }
}

/// Run the full analysis of one space.
pub fn analyze_space<S: ContentStore + ?Sized>(store: &S, space: &Space, top: usize) -> Result<SpaceReport> {
    SpaceContext::load(store, space)?.report(store, top)
}
