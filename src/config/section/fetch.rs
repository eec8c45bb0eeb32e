//! `[fetch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [fetch]
//! timeout = 30              # seconds per request
//! retries = 3               # retry attempts after the first try
//! retry_delay_ms = 1000     # linear backoff base
//! space_limit = 50          # page size for the space listing
//! page_limit = 100          # page size for page/attachment listings
//! content_types = ["page", "blogpost"]
//! version_history = true    # fetch all attachment versions (renames)
//! jobs = 1                  # spaces audited in parallel
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::store::{ContentType, RestStoreOptions};

/// Content retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,

    /// Retry attempts for transient failures.
    pub retries: u32,

    /// Base delay between retries (multiplied by the attempt number).
    pub retry_delay_ms: u64,

    pub space_limit: usize,

    pub page_limit: usize,

    /// Content types treated as pages: `page`, `blogpost`.
    pub content_types: Vec<String>,

    /// Fetch the full version history of each attachment.
    pub version_history: bool,

    /// Number of spaces audited concurrently.
    pub jobs: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            retries: 3,
            retry_delay_ms: 1000,
            space_limit: 50,
            page_limit: 100,
            content_types: vec!["page".to_string()],
            version_history: true,
            jobs: 1,
        }
    }
}

pub struct FetchConfigFields {
    pub timeout: FieldPath,
    pub space_limit: FieldPath,
    pub page_limit: FieldPath,
    pub content_types: FieldPath,
    pub jobs: FieldPath,
}

impl FetchConfig {
    pub const FIELDS: FetchConfigFields = FetchConfigFields {
        timeout: FieldPath::new("fetch.timeout"),
        space_limit: FieldPath::new("fetch.space_limit"),
        page_limit: FieldPath::new("fetch.page_limit"),
        content_types: FieldPath::new("fetch.content_types"),
        jobs: FieldPath::new("fetch.jobs"),
    };

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Parsed content types. Unknown names are skipped (reported by `validate`).
    pub fn content_types(&self) -> Vec<ContentType> {
        let mut types: Vec<_> = self
            .content_types
            .iter()
            .filter_map(|t| ContentType::parse(t))
            .collect();
        types.dedup();
        types
    }

    pub fn store_options(&self) -> RestStoreOptions {
        RestStoreOptions {
            space_limit: self.space_limit,
            page_limit: self.page_limit,
            content_types: self.content_types(),
            version_history: self.version_history,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.timeout == 0 {
            diag.error(Self::FIELDS.timeout, "timeout must be at least 1 second");
        }
        if self.space_limit == 0 {
            diag.error(Self::FIELDS.space_limit, "must be at least 1");
        }
        if self.page_limit == 0 {
            diag.error(Self::FIELDS.page_limit, "must be at least 1");
        }
        if self.jobs == 0 {
            diag.error(Self::FIELDS.jobs, "must be at least 1");
        }
        if self.content_types.is_empty() {
            diag.error(Self::FIELDS.content_types, "at least one content type is required");
        }
        for name in &self.content_types {
            if ContentType::parse(name).is_none() {
                diag.error_with_hint(
                    Self::FIELDS.content_types,
                    format!("unknown content type `{name}`"),
                    "supported: page, blogpost",
                );
            }
        }
    }
}
