//! Wire types for the wiki REST API (`/rest/api/...`).
//!
//! Only the fields the audit needs are modeled; everything else is ignored.

use serde::Deserialize;

use crate::model::{Attachment, AttachmentVersion, Page, Space};
use crate::utils::date::DateTimeUtc;

/// One page of a paginated listing.
#[derive(Debug, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default, rename = "_links")]
    pub links: Links,
}

impl<T> Paged<T> {
    pub fn has_next(&self) -> bool {
        self.links.next.is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    pub next: Option<String>,
    pub webui: Option<String>,
    pub download: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpaceDto {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

impl From<SpaceDto> for Space {
    fn from(dto: SpaceDto) -> Self {
        Space::new(dto.key, dto.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub version: Option<VersionDto>,
    #[serde(default)]
    pub extensions: Extensions,
    pub body: Option<BodyDto>,
    #[serde(default, rename = "_links")]
    pub links: Links,
}

impl ContentDto {
    pub fn into_page(self, space_key: &str) -> Page {
        let mut page = Page::new(&self.id, self.title, space_key);
        page.webui = self.links.webui;
        page
    }

    /// Convert an attachment listing entry. Returns the attachment and its
    /// current version number.
    pub fn into_attachment(self, owner: &str) -> (Attachment, u32, Option<DateTimeUtc>) {
        let current = self.version.as_ref().map_or(1, |v| v.number);
        let created = self.version.as_ref().and_then(VersionDto::created);
        let mut attachment = Attachment::new(&self.id, owner, self.title, self.extensions.file_size.unwrap_or(0));
        attachment.media_type = self.extensions.media_type;
        attachment.download = self.links.download;
        (attachment, current, created)
    }

    pub fn into_storage(self) -> Option<String> {
        self.body.and_then(|b| b.storage).map(|s| s.value)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
    pub media_type: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct VersionDto {
    pub number: u32,
    pub when: Option<String>,
    /// Present on `/version?expand=content`
    pub content: Option<Box<ContentDto>>,
}

impl VersionDto {
    fn created(&self) -> Option<DateTimeUtc> {
        self.when.as_deref().and_then(DateTimeUtc::parse)
    }

    /// Convert a history entry, falling back to the current filename when the
    /// entry does not carry its own.
    pub fn into_version(self, current_filename: &str) -> AttachmentVersion {
        let created = self.created();
        let (filename, size) = match self.content {
            Some(content) if !content.title.is_empty() => (content.title, content.extensions.file_size),
            Some(content) => (current_filename.to_string(), content.extensions.file_size),
            None => (current_filename.to_string(), None),
        };
        AttachmentVersion {
            number: self.number,
            filename,
            size,
            created,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BodyDto {
    pub storage: Option<StorageDto>,
}

#[derive(Debug, Deserialize)]
pub struct StorageDto {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_listing_entry() {
        let json = r#"{
            "id": "att42", "type": "attachment", "status": "current", "title": "Plan.pdf",
            "version": {"number": 3, "when": "2024-02-03T04:05:06.000Z"},
            "extensions": {"mediaType": "application/pdf", "fileSize": 2048, "comment": ""},
            "_links": {"download": "/download/attachments/7/Plan.pdf?version=3", "webui": "/x"}
        }"#;
        let dto: ContentDto = serde_json::from_str(json).unwrap();
        let (att, current, created) = dto.into_attachment("7");
        assert_eq!(att.id, "att42");
        assert_eq!(att.owner.as_str(), "7");
        assert_eq!(att.size, 2048);
        assert_eq!(att.media_type.as_deref(), Some("application/pdf"));
        assert_eq!(current, 3);
        assert_eq!(created, DateTimeUtc::parse("2024-02-03T04:05:06Z"));
    }

    #[test]
    fn test_paged_next() {
        let json = r#"{"results": [{"key": "DOC", "name": "Docs"}], "start": 0, "limit": 1, "size": 1,
                       "_links": {"next": "/rest/api/space?start=1", "base": "https://x"}}"#;
        let page: Paged<SpaceDto> = serde_json::from_str(json).unwrap();
        assert!(page.has_next());
        assert_eq!(page.results[0].key, "DOC");

        let last: Paged<SpaceDto> = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(!last.has_next());
    }

    #[test]
    fn test_version_entry_uses_own_title() {
        let json = r#"{"number": 1, "when": "2020-01-01T00:00:00Z",
                       "content": {"id": "att42", "title": "draft.pdf", "extensions": {"fileSize": 10}}}"#;
        let dto: VersionDto = serde_json::from_str(json).unwrap();
        let v = dto.into_version("final.pdf");
        assert_eq!(v.filename, "draft.pdf");
        assert_eq!(v.size, Some(10));

        let bare: VersionDto = serde_json::from_str(r#"{"number": 2}"#).unwrap();
        assert_eq!(bare.into_version("final.pdf").filename, "final.pdf");
    }

    #[test]
    fn test_storage_body() {
        let json = r#"{"id": "1", "title": "Home", "body": {"storage": {"value": "<p>hi</p>", "representation": "storage"}}}"#;
        let dto: ContentDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.into_storage().as_deref(), Some("<p>hi</p>"));
    }
}
