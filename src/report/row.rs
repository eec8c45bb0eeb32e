//! Report row fields shared by the CSV and HTML writers.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::usage::{PageLink, UsageRow};

/// Characters escaped in a filename used as a download path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Size in MB with two decimals, e.g. `1.50`.
#[allow(clippy::cast_precision_loss)] // Display only
pub fn megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MB)
}

/// `yes` / `no`
#[inline]
pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// A usage row resolved against the site base URL.
pub struct ReportRow<'a> {
    pub row: &'a UsageRow,
    base_url: &'a str,
}

impl<'a> ReportRow<'a> {
    pub fn new(row: &'a UsageRow, base_url: &'a str) -> Self {
        Self { row, base_url }
    }

    #[inline]
    pub fn filename(&self) -> &str {
        &self.row.item.attachment.filename
    }

    #[inline]
    pub fn bytes(&self) -> u64 {
        self.row.size()
    }

    pub fn last_modified(&self) -> String {
        self.row
            .item
            .last_modified()
            .map(|dt| dt.to_display())
            .unwrap_or_default()
    }

    /// Download URL reported by the store, else the conventional path.
    pub fn download_url(&self) -> String {
        let attachment = &self.row.item.attachment;
        match &attachment.download {
            Some(link) => absolute(self.base_url, link),
            None => format!(
                "{}/download/attachments/{}/{}",
                self.base_url,
                attachment.owner,
                utf8_percent_encode(&attachment.filename, SEGMENT)
            ),
        }
    }

    pub fn owner(&self) -> &PageLink {
        &self.row.usage.evidence.owner
    }

    pub fn page_url(&self, page: &PageLink) -> String {
        match &page.webui {
            Some(webui) => absolute(self.base_url, webui),
            None => format!("{}/pages/viewpage.action?pageId={}", self.base_url, page.id),
        }
    }

    /// Pages other than the owner linking to the attachment.
    pub fn linked_from(&self) -> &[PageLink] {
        &self.row.usage.evidence.linked_from
    }

    /// `Title (url)` entries joined by `, `.
    pub fn linked_from_text(&self) -> String {
        self.linked_from()
            .iter()
            .map(|p| format!("{} ({})", p.title, self.page_url(p)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Attachment management page of the owning page.
    pub fn attachments_page_url(&self) -> String {
        format!(
            "{}/pages/viewpageattachments.action?pageId={}",
            self.base_url, self.row.item.attachment.owner
        )
    }

    /// REST endpoint a `DELETE` would target. Nothing is ever deleted here.
    pub fn api_delete_url(&self) -> String {
        format!("{}/rest/api/content/{}", self.base_url, self.row.item.attachment.id)
    }
}

/// Join a server-relative link onto the base URL; absolute links pass through.
fn absolute(base_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else if link.starts_with('/') {
        format!("{base_url}{link}")
    } else {
        format!("{base_url}/{link}")
    }
}
