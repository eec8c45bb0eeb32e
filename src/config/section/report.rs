//! `[report]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [report]
//! output = "attic-report"           # a timestamped run folder is created inside
//! top = 100                         # size of the largest-attachments list
//! formats = ["csv", "html", "json"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Csv,
    Html,
    Json,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Parent directory of run folders (relative to the config file).
    pub output: PathBuf,

    /// Number of largest attachments listed per space.
    pub top: usize,

    /// Report formats to write.
    pub formats: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("attic-report"),
            top: 100,
            formats: vec!["csv".to_string(), "html".to_string(), "json".to_string()],
        }
    }
}

pub struct ReportConfigFields {
    pub top: FieldPath,
    pub formats: FieldPath,
}

impl ReportConfig {
    pub const FIELDS: ReportConfigFields = ReportConfigFields {
        top: FieldPath::new("report.top"),
        formats: FieldPath::new("report.formats"),
    };

    pub fn normalize_paths(&mut self, root: &Path) {
        if self.output.is_relative() {
            self.output = root.join(&self.output);
        }
    }

    /// Selected formats, unknown names skipped.
    pub fn formats(&self) -> Vec<ReportFormat> {
        let mut formats = Vec::new();
        for format in self.formats.iter().filter_map(|f| ReportFormat::parse(f)) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.top == 0 {
            diag.error(Self::FIELDS.top, "must be at least 1");
        }
        for name in &self.formats {
            if ReportFormat::parse(name).is_none() {
                diag.error_with_hint(
                    Self::FIELDS.formats,
                    format!("unknown format `{name}`"),
                    "supported: csv, html, json",
                );
            }
        }
        if self.formats.is_empty() {
            diag.warn(Self::FIELDS.formats, "no formats selected, only index.html and summary.json are written");
        }
    }
}
