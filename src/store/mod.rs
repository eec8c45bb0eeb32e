//! Content store: the read-only source of spaces, pages, attachments and bodies.
//!
//! The audit talks to the wiki only through [`ContentStore`]. Two
//! implementations exist:
//! - [`RestStore`]: the wiki REST API over blocking HTTP
//! - `MemoryStore`: fixtures held in memory (tests only)

mod api;
mod client;
mod error;
#[cfg(test)]
mod memory;
mod rest;

use std::collections::VecDeque;

pub use client::{HttpClient, HttpConfig};
pub use error::FetchError;
#[cfg(test)]
pub use memory::MemoryStore;
pub use rest::{ContentType, RestStore, RestStoreOptions};

use crate::model::{Page, Space, VersionedAttachment};

/// Lazily fetched listing. Yields items until exhausted or the first error.
pub type Listing<'a, T> = Box<dyn Iterator<Item = Result<T, FetchError>> + 'a>;

/// Read-only access to wiki content.
///
/// Implementations must be shareable across worker threads; each call is
/// independent.
pub trait ContentStore: Sync {
    /// All spaces visible to the credentials.
    fn list_spaces(&self) -> Listing<'_, Space>;

    /// All pages of one space.
    fn list_pages<'a>(&'a self, space: &'a Space) -> Listing<'a, Page>;

    /// Attachments owned by one page, each with its version history.
    fn list_attachments(&self, page: &Page) -> Result<Vec<VersionedAttachment>, FetchError>;

    /// Raw storage-format body. `None` when the page no longer exists.
    fn get_body(&self, page: &Page) -> Result<Option<String>, FetchError>;

    /// Site base URL used to build links in reports.
    fn base_url(&self) -> &str;
}

/// One fetched batch of a paginated listing.
pub struct Batch<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

/// Offset-paginated iterator over a listing endpoint.
///
/// `fetch(start)` returns the batch beginning at `start`. The next offset
/// advances by the number of items actually returned, so servers that cap
/// the page size below the requested limit are handled.
pub struct Paginated<'a, T> {
    fetch: Box<dyn FnMut(usize) -> Result<Batch<T>, FetchError> + 'a>,
    start: usize,
    buffer: VecDeque<T>,
    done: bool,
}

impl<'a, T> Paginated<'a, T> {
    pub fn new(fetch: impl FnMut(usize) -> Result<Batch<T>, FetchError> + 'a) -> Self {
        Self {
            fetch: Box::new(fetch),
            start: 0,
            buffer: VecDeque::new(),
            done: false,
        }
    }
}

impl<T> Iterator for Paginated<'_, T> {
    type Item = Result<T, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            match (self.fetch)(self.start) {
                Ok(batch) => {
                    self.start += batch.items.len();
                    self.done = !batch.has_next || batch.items.is_empty();
                    self.buffer.extend(batch.items);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
