//! Content store backed by the wiki REST API.

use serde::de::DeserializeOwned;

use super::api::{ContentDto, Paged, SpaceDto, VersionDto};
use super::{Batch, ContentStore, FetchError, HttpClient, Listing, Paginated};
use crate::log;
use crate::model::{AttachmentVersion, Page, Space, VersionedAttachment};

/// Content type listed as pages of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Page,
    BlogPost,
}

impl ContentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" => Some(Self::Page),
            "blogpost" => Some(Self::BlogPost),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::BlogPost => "blogpost",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestStoreOptions {
    pub space_limit: usize,
    pub page_limit: usize,
    pub content_types: Vec<ContentType>,
    /// Fetch full attachment history (renames) instead of current version only
    pub version_history: bool,
}

impl Default for RestStoreOptions {
    fn default() -> Self {
        Self {
            space_limit: 50,
            page_limit: 100,
            content_types: vec![ContentType::Page],
            version_history: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestStore {
    http: HttpClient,
    options: RestStoreOptions,
}

impl RestStore {
    pub fn new(http: HttpClient, options: RestStoreOptions) -> Self {
        Self { http, options }
    }

    /// Paginated listing of `path`, converting each result with `convert`.
    fn listing<'a, D, T>(
        &'a self,
        path: String,
        limit: usize,
        extra: Vec<(&'static str, String)>,
        convert: impl Fn(D) -> T + 'a,
    ) -> Paginated<'a, T>
    where
        D: DeserializeOwned + 'a,
        T: 'a,
    {
        Paginated::new(move |start| {
            let mut query = extra.clone();
            query.push(("limit", limit.to_string()));
            query.push(("start", start.to_string()));
            let page: Paged<D> = self.http.get_json(&path, &query)?;
            let has_next = page.has_next();
            Ok(Batch {
                items: page.results.into_iter().map(&convert).collect(),
                has_next,
            })
        })
    }

    fn versions(&self, attachment_id: &str, current_filename: &str) -> Result<Vec<AttachmentVersion>, FetchError> {
        let path = format!("/rest/api/content/{attachment_id}/version");
        let current = current_filename.to_string();
        self.listing(
            path,
            self.options.page_limit,
            vec![("expand", "content".to_string())],
            move |dto: VersionDto| dto.into_version(&current),
        )
        .collect()
    }
}

impl ContentStore for RestStore {
    fn list_spaces(&self) -> Listing<'_, Space> {
        Box::new(self.listing(
            "/rest/api/space".to_string(),
            self.options.space_limit,
            Vec::new(),
            |dto: SpaceDto| Space::from(dto),
        ))
    }

    fn list_pages<'a>(&'a self, space: &'a Space) -> Listing<'a, Page> {
        let key = space.key.as_str();
        Box::new(self.options.content_types.iter().flat_map(move |kind| {
            self.listing(
                "/rest/api/content".to_string(),
                self.options.page_limit,
                vec![("spaceKey", key.to_string()), ("type", kind.as_str().to_string())],
                move |dto: ContentDto| dto.into_page(key),
            )
        }))
    }

    fn list_attachments(&self, page: &Page) -> Result<Vec<VersionedAttachment>, FetchError> {
        let path = format!("/rest/api/content/{}/child/attachment", page.id);
        let owner = page.id.as_str();
        let listed: Vec<_> = self
            .listing(
                path,
                self.options.page_limit,
                vec![("expand", "version".to_string())],
                move |dto: ContentDto| dto.into_attachment(owner),
            )
            .collect::<Result<_, _>>()?;

        let mut result = Vec::with_capacity(listed.len());
        for (attachment, current, created) in listed {
            let mut history = if self.options.version_history {
                match self.versions(&attachment.id, &attachment.filename) {
                    Ok(history) => history,
                    Err(e) => {
                        log!("warning"; "history of {} on page {} unavailable, using current version only: {}",
                            attachment.filename, page.id, e);
                        Vec::new()
                    }
                }
            } else {
                Vec::new()
            };

            if !history.iter().any(|v| v.number == current) {
                history.push(AttachmentVersion {
                    number: current,
                    filename: attachment.filename.clone(),
                    size: Some(attachment.size),
                    created,
                });
            }
            result.push(VersionedAttachment::new(attachment, current, history));
        }
        Ok(result)
    }

    fn get_body(&self, page: &Page) -> Result<Option<String>, FetchError> {
        let path = format!("/rest/api/content/{}", page.id);
        let query = [("expand", "body.storage".to_string())];
        let content: Option<ContentDto> = self.http.get_json_opt(&path, &query)?;
        Ok(content.map(|c| c.into_storage().unwrap_or_default()))
    }

    fn base_url(&self) -> &str {
        self.http.base_url()
    }
}
