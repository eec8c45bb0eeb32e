//! Embedded static resources for report output.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `report` - HTML page shell with the inline table sorter
//!
//! # Usage
//!
//! ```ignore
//! use embed::report::{PAGE_HTML, PageVars};
//!
//! let html = PAGE_HTML.render(&PageVars {
//!     title: "DOC attachments".into(),
//!     body: "<h1>...</h1>".into(),
//! });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod report {
    use super::{Template, TemplateVars};

    /// Inline table sorter, shared by every report page.
    const SORT_JS: &str = include_str!("report/sort.js");

    /// Variables for page.html.
    ///
    /// `title` is plain text and gets escaped; `body` is trusted markup
    /// produced by the report writer.
    pub struct PageVars {
        pub title: String,
        pub body: String,
    }

    impl TemplateVars for PageVars {
        fn apply(&self, content: &str) -> String {
            // body last: it carries wiki-controlled text
            content
                .replace("__ATTIC_SORT_JS__", SORT_JS)
                .replace("__ATTIC_TITLE__", &crate::utils::html::escape(&self.title))
                .replace("__ATTIC_BODY__", &self.body)
        }
    }

    /// Standalone HTML page with styles and the sorter.
    pub const PAGE_HTML: Template<PageVars> = Template::new(include_str!("report/page.html"));
}
