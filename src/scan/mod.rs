//! Storage-format reference scanner.
//!
//! Walks a page body as a stream of markup events and collects every
//! attachment reference, classified as embedded (inline media, embedding
//! macros) or linked (hyperlinks, download and preview URLs).
//!
//! Bodies are fragments with entities and loosely nested tags, so the reader
//! runs with end-name checks disabled and an explicit element stack that
//! closes to the nearest matching open tag. Only syntax the reader cannot
//! tokenize at all (e.g. an unterminated tag) is reported as [`ScanError`].
//!
//! | Markup                                                     | Kind     |
//! |------------------------------------------------------------|----------|
//! | `<ac:image><ri:attachment/></ac:image>`                     | embedded |
//! | `<ac:structured-macro ac:name="view-file">..<ri:attachment/>..` | embedded |
//! | `<img src=".../download/attachments/<id>/<file>">`         | embedded |
//! | `<ac:link><ri:attachment/></ac:link>`                       | linked   |
//! | `<a href=".../download/attachments/<id>/<file>">`          | linked   |
//! | `<a href="...viewpageattachments.action?preview=...">`     | linked   |
//! | `<ri:attachment/>` in any other context                    | linked   |
//!
//! Only media macros (file viewers, multimedia, widgets) display their
//! attachment. Wrapper macros such as `info` or `expand` leave the role of
//! their content unchanged.
//!
//! A `ri:attachment` names its owner with a nested `ri:page`, `ri:blog-post`
//! or `ri:content-entity`. Any other nested resource (a space, a user) cannot
//! be mapped to a page, so the reference is dropped.

mod reference;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

pub use reference::{AttachmentRef, Owner, PageRefs};

use crate::core::{AttachmentLink, CanonicalName};
use crate::model::PageId;
use crate::utils::html;

/// Body could not be tokenized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed markup at byte {position}: {message}")]
pub struct ScanError {
    pub position: u64,
    pub message: String,
}

/// Scan one page body for attachment references.
///
/// References without an explicit owner are attributed to `page`.
/// Pure: the same body always yields the same result.
pub fn scan_page(page: &PageId, body: &str) -> Result<PageRefs, ScanError> {
    let mut reader = Reader::from_str(body);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;
    config.allow_dangling_amp = true;

    let mut scanner = Scanner::new(page);

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) => scanner.open(&elem, false),
            Ok(Event::Empty(elem)) => scanner.open(&elem, true),
            Ok(Event::End(elem)) => scanner.close(elem.name().as_ref()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ScanError {
                    position: reader.error_position(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(scanner.finish())
}

// ============================================================================
// Scanner state
// ============================================================================

/// Macros that render an attachment inline.
const MEDIA_MACROS: &[&str] = &[
    "view-file",
    "viewfile",
    "multimedia",
    "pdf",
    "viewpdf",
    "viewdoc",
    "viewxls",
    "viewppt",
    "office-word",
    "office-excel",
    "office-powerpoint",
    "widget",
];

/// What an open element contributes to the references below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Inline display: `ac:image`, media macros
    Media,
    /// Hyperlink: `ac:link`
    Link,
    Other,
}

impl Role {
    fn of(elem: &BytesStart<'_>) -> Self {
        match elem.name().as_ref() {
            b"ac:image" => Self::Media,
            b"ac:structured-macro" | b"ac:macro" => match attr(elem, b"ac:name") {
                Some(name) if is_media_macro(&name) => Self::Media,
                _ => Self::Other,
            },
            b"ac:link" => Self::Link,
            _ => Self::Other,
        }
    }
}

fn is_media_macro(name: &str) -> bool {
    let name = name.trim();
    MEDIA_MACROS.iter().any(|m| m.eq_ignore_ascii_case(name))
}

/// Roles of all open ancestors.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    in_media: bool,
    in_link: bool,
}

/// `ri:attachment` opened but not yet closed (may receive a nested owner).
#[derive(Debug)]
struct Pending {
    reference: AttachmentRef,
    context: Context,
    /// Cleared when the nested resource is not a page
    attributed: bool,
}

impl Pending {
    fn new(reference: AttachmentRef, context: Context) -> Self {
        Self {
            reference,
            context,
            attributed: true,
        }
    }
}

#[derive(Debug)]
struct Frame {
    name: Box<[u8]>,
    role: Role,
    pending: Option<Pending>,
}

struct Scanner<'a> {
    page: &'a PageId,
    stack: Vec<Frame>,
    refs: PageRefs,
}

impl<'a> Scanner<'a> {
    fn new(page: &'a PageId) -> Self {
        Self {
            page,
            stack: Vec::new(),
            refs: PageRefs::default(),
        }
    }

    fn context(&self) -> Context {
        self.stack.iter().fold(Context::default(), |ctx, frame| Context {
            in_media: ctx.in_media || frame.role == Role::Media,
            in_link: ctx.in_link || frame.role == Role::Link,
        })
    }

    fn open(&mut self, elem: &BytesStart<'_>, empty: bool) {
        let name = elem.name();
        let name = name.as_ref();
        let mut pending = None;

        match name {
            b"ri:attachment" => {
                if let Some(reference) = self.attachment_ref(elem) {
                    let p = Pending::new(reference, self.context());
                    if empty {
                        self.emit(p);
                    } else {
                        pending = Some(p);
                    }
                }
            }
            b"ri:url" => {
                if let Some(link) = attr(elem, b"ri:value").and_then(|v| AttachmentLink::parse(&v)) {
                    let context = self.context();
                    self.emit(Pending::new(link.into(), context));
                }
            }
            _ if name.starts_with(b"ri:") => self.apply_owner_hint(elem),
            b"img" => {
                for key in [b"src".as_slice(), b"data-image-src".as_slice()] {
                    if let Some(link) = attr(elem, key).and_then(|v| AttachmentLink::parse(&v)) {
                        self.refs.embedded.insert(link.into());
                    }
                }
            }
            b"a" => {
                if let Some(link) = attr(elem, b"href").and_then(|v| AttachmentLink::parse(&v)) {
                    self.refs.linked.insert(link.into());
                }
            }
            _ => {}
        }

        if !empty {
            self.stack.push(Frame {
                name: name.into(),
                role: Role::of(elem),
                pending,
            });
        }
    }

    /// Close the nearest open element with this name, implicitly closing
    /// anything opened after it. Stray end tags are ignored.
    fn close(&mut self, name: &[u8]) {
        let Some(pos) = self.stack.iter().rposition(|f| &*f.name == name) else {
            return;
        };
        let closed = self.stack.split_off(pos);
        for frame in closed.into_iter().rev() {
            if let Some(p) = frame.pending {
                self.emit(p);
            }
        }
    }

    fn finish(mut self) -> PageRefs {
        let open = std::mem::take(&mut self.stack);
        for frame in open.into_iter().rev() {
            if let Some(p) = frame.pending {
                self.emit(p);
            }
        }
        self.refs
    }

    fn emit(&mut self, p: Pending) {
        let Pending {
            reference,
            context,
            attributed,
        } = p;
        if !attributed {
            return;
        }
        if context.in_media {
            self.refs.embedded.insert(reference.clone());
        }
        if context.in_link || !context.in_media {
            self.refs.linked.insert(reference);
        }
    }

    fn attachment_ref(&self, elem: &BytesStart<'_>) -> Option<AttachmentRef> {
        let filename = attr(elem, b"ri:filename")?;
        let name = CanonicalName::new(&filename);
        if name.is_empty() {
            return None;
        }
        let version = attr(elem, b"ri:version-at-save").and_then(|v| v.trim().parse().ok());
        Some(AttachmentRef {
            owner: Owner::page(self.page),
            name,
            version,
        })
    }

    /// Resource nested directly in an open `ri:attachment` names its owner.
    ///
    /// `ri:page`, `ri:blog-post` and `ri:content-entity` resolve to a page of
    /// the space; anything else leaves the reference without an owner.
    fn apply_owner_hint(&mut self, elem: &BytesStart<'_>) {
        let Some(pending) = self.stack.last_mut().and_then(|f| f.pending.as_mut()) else {
            return;
        };

        let owner = match elem.name().as_ref() {
            b"ri:page" | b"ri:blog-post" | b"ri:content-entity" => {
                if let Some(id) = attr(elem, b"ri:content-id").filter(|id| !id.trim().is_empty()) {
                    Some(Owner::Page {
                        id: PageId::new(id.trim()),
                    })
                } else {
                    attr(elem, b"ri:content-title").map(|title| Owner::Titled {
                        title,
                        space_key: attr(elem, b"ri:space-key"),
                    })
                }
            }
            _ => None,
        };

        match owner {
            Some(owner) => pending.reference.owner = owner,
            None => pending.attributed = false,
        }
    }
}

/// Attribute value with entities decoded once. Malformed attributes are skipped.
fn attr(elem: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    elem.html_attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| html::unescape(&String::from_utf8_lossy(&a.value)).into_owned())
}

// ============================================================================
// Tests
// ============================================================================
