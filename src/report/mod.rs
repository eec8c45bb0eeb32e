//! Report output for an audit run.
//!
//! # Layout
//!
//! ```text
//! <output>/attic_<YYYY-MM-DD_HH-MM-SS>/
//! ├── index.html                 # overview of all spaces
//! ├── summary.json               # machine-readable totals
//! └── <KEY>/
//!     ├── <KEY>_attachments.{csv,html,json}
//!     └── <KEY>_unreferenced.{csv,html}
//! ```
//!
//! A space folder is written under `<KEY>.partial` and renamed into place
//! once every file exists, so a failing space never leaves half a report.

mod csv;
mod html;
mod row;
mod summary;

pub use summary::{FailedSpace, RunSummary, SpaceSummary};

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::ReportFormat;
use crate::model::Space;
use crate::usage::{SpaceReport, UsageRow};
use crate::utils::date::DateTimeUtc;
use html::Listing;

/// Writes the report files of one run.
///
/// Spaces can be written concurrently: each one only touches its own folder.
#[derive(Debug)]
pub struct RunWriter {
    dir: PathBuf,
    base_url: String,
    formats: Vec<ReportFormat>,
    /// Space folder names handed out so far (lowercased)
    claimed: Mutex<FxHashSet<String>>,
}

impl RunWriter {
    /// Create the run folder inside `parent`.
    ///
    /// A second run within the same second gets a numeric suffix.
    pub fn create(parent: &Path, started: DateTimeUtc, base_url: &str, formats: Vec<ReportFormat>) -> Result<Self> {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory {}", parent.display()))?;

        let stamp = started.to_folder_stamp();
        let mut n = 1;
        let dir = loop {
            let name = if n == 1 {
                format!("attic_{stamp}")
            } else {
                format!("attic_{stamp}_{n}")
            };
            let dir = parent.join(name);
            match fs::create_dir(&dir) {
                Ok(()) => break dir,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to create {}", dir.display()));
                }
            }
        };

        Ok(Self {
            dir,
            base_url: base_url.to_string(),
            formats,
            claimed: Mutex::new(FxHashSet::default()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn has(&self, format: ReportFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Write all files of one space and move them into place.
    pub fn write_space(&self, report: &SpaceReport) -> Result<SpaceSummary> {
        let name = self.claim(&report.space.key);
        let staging = self.dir.join(format!("{name}.partial"));
        let target = self.dir.join(&name);

        if staging.exists() {
            fs::remove_dir_all(&staging)
                .with_context(|| format!("failed to clear {}", staging.display()))?;
        }
        fs::create_dir(&staging).with_context(|| format!("failed to create {}", staging.display()))?;

        if let Err(e) = self.write_space_files(&staging, &name, report) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        if let Err(e) = fs::rename(&staging, &target) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e).with_context(|| format!("failed to move report to {}", target.display()));
        }

        let html_dir = self.has(ReportFormat::Html).then_some(name.as_str());
        Ok(SpaceSummary::new(report, html_dir))
    }

    /// Reserve a folder name for a space key.
    ///
    /// Keys that sanitize to the same name (`~ab` and `_ab`) get a numeric
    /// suffix, in the order their spaces are written.
    fn claim(&self, key: &str) -> String {
        let base = dir_name(key);
        let mut claimed = self.claimed.lock();
        let mut n = 1;
        loop {
            let name = if n == 1 { base.clone() } else { format!("{base}_{n}") };
            if claimed.insert(name.to_lowercase()) {
                return name;
            }
            n += 1;
        }
    }

    fn write_space_files(&self, dir: &Path, prefix: &str, report: &SpaceReport) -> Result<()> {
        let unreferenced: Vec<&UsageRow> = report.unreferenced().collect();

        if self.has(ReportFormat::Csv) {
            write_with(&dir.join(format!("{prefix}_attachments.csv")), |w| {
                csv::write(w, &report.rows, &self.base_url)
            })?;
            write_with(&dir.join(format!("{prefix}_unreferenced.csv")), |w| {
                csv::write(w, unreferenced.iter().copied(), &self.base_url)
            })?;
        }

        if self.has(ReportFormat::Html) {
            write_file(
                &dir.join(format!("{prefix}_attachments.html")),
                &html::space_page(report, Listing::Top, &self.base_url),
            )?;
            write_file(
                &dir.join(format!("{prefix}_unreferenced.html")),
                &html::space_page(report, Listing::Unreferenced, &self.base_url),
            )?;
        }

        if self.has(ReportFormat::Json) {
            let document = SpaceDocument {
                space: &report.space,
                total_bytes: report.total_bytes,
                unreferenced_bytes: report.unreferenced_bytes,
                file_count: report.file_count(),
                unreferenced_count: unreferenced.len(),
                attachments: &report.rows,
            };
            write_with(&dir.join(format!("{prefix}_attachments.json")), |w| {
                serde_json::to_writer_pretty(&mut *w, &document).map_err(io::Error::from)
            })?;
        }

        Ok(())
    }

    /// Write `index.html` and `summary.json` for the run.
    pub fn finish(&self, summary: &RunSummary) -> Result<()> {
        write_file(&self.dir.join("index.html"), &html::overview_page(summary))?;
        write_with(&self.dir.join("summary.json"), |w| {
            serde_json::to_writer_pretty(&mut *w, summary).map_err(io::Error::from)
        })
    }
}

/// Per-space JSON document: totals plus every ranked attachment.
#[derive(Serialize)]
struct SpaceDocument<'a> {
    space: &'a Space,
    total_bytes: u64,
    unreferenced_bytes: u64,
    file_count: usize,
    unreferenced_count: usize,
    attachments: &'a [UsageRow],
}

/// Folder name for a space key. Personal keys like `~jdoe` become `_jdoe`.
fn dir_name(key: &str) -> String {
    let name: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() { "_".to_string() } else { name }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn write_with(path: &Path, f: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    f(&mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("failed to write {}", path.display()))
}
