//! `attic audit`: audit every selected space and write the report set.

use std::fmt;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::audit::{self, AuditOptions};
use crate::config::AuditConfig;
use crate::core::is_shutdown;
use crate::log;
use crate::model::Space;
use crate::report::{RunSummary, RunWriter};
use crate::store::{ContentStore, HttpClient, RestStore};
use crate::utils::date::DateTimeUtc;
use crate::utils::{format_size, plural_count, plural_s};

/// Run the audit against the configured site.
///
/// Returns the run summary; the caller decides the exit status from
/// `summary.failed`.
pub fn run_audit(config: &AuditConfig) -> Result<RunSummary> {
    let http = HttpClient::new(config.http_config()?)?;
    let store = RestStore::new(http, config.fetch.store_options());
    execute(&store, config, is_shutdown)
}

/// Audit with any store. Split from [`run_audit`] so runs can be driven
/// against an in-memory store.
pub fn execute<S: ContentStore + ?Sized>(
    store: &S,
    config: &AuditConfig,
    should_stop: impl Fn() -> bool + Sync,
) -> Result<RunSummary> {
    let spaces = select_spaces(store, config)?;

    let started = DateTimeUtc::now();
    let writer = RunWriter::create(
        &config.report.output,
        started,
        store.base_url(),
        config.report.formats(),
    )?;

    log!("audit"; "auditing {} into {}", plural_count(spaces.len(), "space"), writer.dir().display());

    let options = AuditOptions {
        jobs: config.fetch.jobs,
        top: config.report.top,
        progress: !spaces.is_empty(),
    };
    let outcome = audit::run(store, &spaces, options, should_stop, |report| writer.write_space(report))?;

    let mut summary = RunSummary::new(started, store.base_url());
    summary.spaces = outcome.spaces;
    summary.failed = outcome.failed;
    summary.interrupted = outcome.interrupted;
    summary.sort();
    writer.finish(&summary)?;

    RunOverview(&summary).print();
    log!("report"; "{}", writer.dir().join("index.html").display());
    Ok(summary)
}

/// List spaces and keep those the filter accepts.
///
/// A failing space listing is fatal for the run.
fn select_spaces<S: ContentStore + ?Sized>(store: &S, config: &AuditConfig) -> Result<Vec<Space>> {
    let filter = config.space_filter()?;
    let all: Vec<Space> = store
        .list_spaces()
        .collect::<Result<_, _>>()
        .context("failed to list spaces")?;

    for key in &config.only_spaces {
        if !all.iter().any(|s| s.key.eq_ignore_ascii_case(key)) {
            log!("warning"; "space `{}` not found or not visible", key);
        }
    }

    let selected: Vec<Space> = all.into_iter().filter(|s| filter.matches(&s.key)).collect();
    if selected.is_empty() {
        log!("warning"; "no spaces selected");
    }
    Ok(selected)
}

/// Console rendering of a finished run.
struct RunOverview<'a>(&'a RunSummary);

impl RunOverview<'_> {
    /// Print per-space lines, then failures.
    fn print(&self) {
        let summary = self.0;
        if !summary.spaces.is_empty() {
            eprintln!();
        }
        for space in &summary.spaces {
            eprintln!(
                "{}{}{} {} {}",
                "[".dimmed(),
                space.key.cyan(),
                "]".dimmed(),
                format!("{}, {}", plural_count(space.file_count, "file"), format_size(space.total_bytes)),
                format!(
                    "({} unreferenced, {})",
                    space.unreferenced_count,
                    format_size(space.unreferenced_bytes)
                )
                .dimmed()
            );
        }

        if !summary.failed.is_empty() {
            eprintln!();
            eprintln!(
                "{} {}",
                "failed".red().bold(),
                format!("({} space{})", summary.failed.len(), plural_s(summary.failed.len())).dimmed()
            );
            for failed in &summary.failed {
                eprintln!("{} {} {}", "→".red(), failed.key, failed.error);
            }
        }
        eprintln!();
        log!("audit"; "{}", self);
    }
}

impl fmt::Display for RunOverview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        write!(
            f,
            "{} {} {} {}",
            plural_count(summary.unreferenced_count(), "unreferenced attachment"),
            "using".dimmed(),
            format_size(summary.unreferenced_bytes()).bold(),
            format!("of {}", format_size(summary.total_bytes())).dimmed()
        )?;
        if summary.interrupted {
            write!(f, " {}", "(interrupted)".yellow())?;
        }
        if !summary.failed.is_empty() {
            let n = summary.failed.len();
            write!(f, ", {}", format!("{n} space{} failed", plural_s(n)).red().bold())?;
        }
        Ok(())
    }
}
