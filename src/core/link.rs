//! Attachment locators embedded in URLs.
//!
//! Recognized shapes (absolute or site-relative, any context path prefix):
//! - `/download/attachments/<pageId>/<file>[?version=N]`
//! - `/download/thumbnails/<pageId>/<file>`
//! - `/pages/viewpageattachments.action?pageId=<id>&preview=/<pageId>/<attId>/<file>`

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use url::Url;

use super::CanonicalName;
use crate::model::PageId;

/// Attachment named by a URL: owner page, filename and optional version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLink {
    pub owner: PageId,
    pub name: CanonicalName,
    pub version: Option<u32>,
}

impl AttachmentLink {
    /// Parse an `href`/`src` value. Returns `None` for anything that does not
    /// point at an attachment.
    pub fn parse(value: &str) -> Option<Self> {
        let url = parse_url(value.trim())?;
        Self::from_download(&url).or_else(|| Self::from_preview(&url))
    }

    fn from_download(url: &Url) -> Option<Self> {
        let segments: Vec<&str> = url.path_segments()?.collect();
        let at = segments
            .windows(2)
            .position(|w| w[0] == "download" && matches!(w[1], "attachments" | "thumbnails"))?;

        let owner = *segments.get(at + 2)?;
        let file = *segments.get(at + 3)?;
        if !is_page_id(owner) || file.is_empty() {
            return None;
        }

        let version = url
            .query_pairs()
            .find(|(k, _)| k == "version")
            .and_then(|(_, v)| v.parse().ok());

        Some(Self {
            owner: PageId::new(owner),
            name: CanonicalName::from_url_segment(file),
            version,
        })
    }

    fn from_preview(url: &Url) -> Option<Self> {
        if !url.path().ends_with("/viewpageattachments.action") {
            return None;
        }
        // raw pair: form decoding would turn a literal '+' into a space
        let raw = url
            .query()?
            .split('&')
            .find_map(|pair| pair.strip_prefix("preview="))?;
        let preview = percent_decode_str(raw).decode_utf8_lossy();

        // "/<pageId>/<attachmentId>/<file>"
        let mut parts = preview.trim_start_matches('/').splitn(3, '/');
        let owner = parts.next()?;
        let _attachment_id = parts.next()?;
        let file = parts.next()?;
        if !is_page_id(owner) || file.is_empty() {
            return None;
        }

        Some(Self {
            owner: PageId::new(owner),
            name: CanonicalName::new(file),
            version: None,
        })
    }
}

/// Parse absolute URLs directly, resolve relative ones against a dummy base.
fn parse_url(value: &str) -> Option<Url> {
    static BASE: LazyLock<Option<Url>> = LazyLock::new(|| Url::parse("http://x/").ok());

    match Url::parse(value) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => BASE.as_ref()?.join(value).ok(),
        Err(_) => None,
    }
}

#[inline]
fn is_page_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(value: &str) -> AttachmentLink {
        AttachmentLink::parse(value).unwrap()
    }

    #[test]
    fn test_relative_download() {
        let l = link("/download/attachments/123/report.pdf");
        assert_eq!(l.owner.as_str(), "123");
        assert_eq!(l.name.as_str(), "report.pdf");
        assert_eq!(l.version, None);
    }

    #[test]
    fn test_absolute_download_with_context_path_and_version() {
        let l = link("https://acme.atlassian.net/wiki/download/attachments/77/Plan%20B.xlsx?version=3&modificationDate=1&api=v2");
        assert_eq!(l.owner.as_str(), "77");
        assert_eq!(l.name.as_str(), "plan b.xlsx");
        assert_eq!(l.version, Some(3));
    }

    #[test]
    fn test_thumbnail() {
        let l = link("/wiki/download/thumbnails/9/diagram.png?api=v2");
        assert_eq!(l.owner.as_str(), "9");
        assert_eq!(l.name.as_str(), "diagram.png");
    }

    #[test]
    fn test_preview_link() {
        let l = link("/pages/viewpageattachments.action?pageId=55&preview=%2F55%2F9001%2FQ3%20numbers.xlsx");
        assert_eq!(l.owner.as_str(), "55");
        assert_eq!(l.name.as_str(), "q3 numbers.xlsx");
    }

    #[test]
    fn test_preview_keeps_plus_literal() {
        let l = link("/pages/viewpageattachments.action?pageId=1&preview=/1/2/c++.png");
        assert_eq!(l.name.as_str(), "c++.png");

        let l = link("/pages/viewpageattachments.action?preview=%2F1%2F2%2Fc%2B%2B%20notes.png");
        assert_eq!(l.name.as_str(), "c++ notes.png");
    }

    #[test]
    fn test_literal_percent_in_filename() {
        let l = link("/download/attachments/1/50%2525off.png");
        assert_eq!(l.name, CanonicalName::new("50%25off.png"));
    }

    #[test]
    fn test_not_attachments() {
        assert!(AttachmentLink::parse("https://example.com/page").is_none());
        assert!(AttachmentLink::parse("/download/attachments/abc/file.png").is_none());
        assert!(AttachmentLink::parse("/download/attachments/123/").is_none());
        assert!(AttachmentLink::parse("/download/attachments/123").is_none());
        assert!(AttachmentLink::parse("#anchor").is_none());
        assert!(AttachmentLink::parse("mailto:someone@example.com").is_none());
        assert!(AttachmentLink::parse("/pages/viewpageattachments.action?pageId=5").is_none());
    }
}
