//! Configuration section definitions.
//!
//! Each module corresponds to a section in `attic.toml`:
//!
//! | Module   | TOML Section | Purpose                                  |
//! |----------|--------------|------------------------------------------|
//! | `site`   | `[site]`     | Wiki URL, credentials, space selection   |
//! | `fetch`  | `[fetch]`    | Timeouts, retries, page sizes, history   |
//! | `report` | `[report]`   | Output folder, top list size, formats    |

mod fetch;
mod report;
mod site;

pub use fetch::FetchConfig;
pub use report::{ReportConfig, ReportFormat};
pub use site::{SiteConfig, SpaceFilter};
