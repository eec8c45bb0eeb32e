//! Machine-readable run summary (`summary.json`).

use serde::Serialize;

use crate::usage::SpaceReport;
use crate::utils::date::DateTimeUtc;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started: DateTimeUtc,
    pub base_url: String,
    /// Stopped by Ctrl+C before every space was processed
    pub interrupted: bool,
    pub spaces: Vec<SpaceSummary>,
    pub failed: Vec<FailedSpace>,
}

impl RunSummary {
    pub fn new(started: DateTimeUtc, base_url: impl Into<String>) -> Self {
        Self {
            started,
            base_url: base_url.into(),
            interrupted: false,
            spaces: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.spaces.iter().map(|s| s.total_bytes).sum()
    }

    pub fn unreferenced_bytes(&self) -> u64 {
        self.spaces.iter().map(|s| s.unreferenced_bytes).sum()
    }

    pub fn unreferenced_count(&self) -> usize {
        self.spaces.iter().map(|s| s.unreferenced_count).sum()
    }

    /// Keep output independent of worker completion order.
    pub fn sort(&mut self) {
        self.spaces.sort_by(|a, b| a.key.cmp(&b.key));
        self.failed.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

/// Totals of one analyzed space.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceSummary {
    pub key: String,
    pub name: String,
    pub total_bytes: u64,
    pub file_count: usize,
    pub unreferenced_count: usize,
    pub unreferenced_bytes: u64,
    pub page_count: usize,
    pub pages_failed: usize,
    pub references: usize,
    /// Report pages relative to the run folder
    pub attachments_html: Option<String>,
    pub unreferenced_html: Option<String>,
}

impl SpaceSummary {
    /// `html_dir` names the space folder when HTML pages were written.
    pub fn new(report: &SpaceReport, html_dir: Option<&str>) -> Self {
        Self {
            key: report.space.key.clone(),
            name: report.space.name.clone(),
            total_bytes: report.total_bytes,
            file_count: report.file_count(),
            unreferenced_count: report.unreferenced_count(),
            unreferenced_bytes: report.unreferenced_bytes,
            page_count: report.page_count,
            pages_failed: report.index.pages_failed,
            references: report.index.references,
            attachments_html: html_dir.map(|dir| format!("{dir}/{dir}_attachments.html")),
            unreferenced_html: html_dir.map(|dir| format!("{dir}/{dir}_unreferenced.html")),
        }
    }
}

/// A space whose analysis was aborted.
#[derive(Debug, Clone, Serialize)]
pub struct FailedSpace {
    pub key: String,
    pub name: String,
    pub error: String,
}
