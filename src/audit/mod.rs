//! Audit run orchestration.
//!
//! Spaces are independent: each one is loaded, indexed, classified and
//! handed to the sink on a bounded worker pool. A failing space is recorded
//! and the others continue. The stop predicate is checked before a space
//! starts; spaces already running are finished.

mod context;

use context::analyze_space;

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::logger::ProgressLine;
use crate::model::Space;
use crate::report::{FailedSpace, SpaceSummary};
use crate::store::ContentStore;
use crate::usage::SpaceReport;
use crate::{debug, log};

#[derive(Debug, Clone, Copy)]
pub struct AuditOptions {
    /// Spaces processed in parallel
    pub jobs: usize,
    /// Size of the largest-attachments list
    pub top: usize,
    /// Show the single-line progress counter
    pub progress: bool,
}

/// What happened to each space of a run.
#[derive(Debug, Default)]
pub struct AuditOutcome {
    pub spaces: Vec<SpaceSummary>,
    pub failed: Vec<FailedSpace>,
    pub interrupted: bool,
}

/// Audit `spaces`, passing each finished report to `sink`.
///
/// The sink writes the report and returns its summary; a sink error counts
/// as a failure of that space.
pub fn run<S, F>(
    store: &S,
    spaces: &[Space],
    options: AuditOptions,
    should_stop: impl Fn() -> bool + Sync,
    sink: F,
) -> Result<AuditOutcome>
where
    S: ContentStore + ?Sized,
    F: Fn(&SpaceReport) -> Result<SpaceSummary> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs.max(1))
        .build()
        .context("failed to create worker pool")?;

    let outcome = Mutex::new(AuditOutcome::default());
    let interrupted = AtomicBool::new(false);
    let progress = options
        .progress
        .then(|| ProgressLine::new(&[("spaces", spaces.len())]));

    pool.install(|| {
        spaces.par_iter().for_each(|space| {
            if should_stop() {
                interrupted.store(true, Ordering::Relaxed);
                return;
            }

            let result = analyze_space(store, space, options.top).and_then(|report| {
                debug!(
                    "audit"; "{}: {} attachments, {} unreferenced",
                    space.key, report.file_count(), report.unreferenced_count()
                );
                sink(&report)
            });

            match result {
                Ok(summary) => outcome.lock().spaces.push(summary),
                Err(e) => {
                    log!("error"; "{}: {:#}", space.key, e);
                    outcome.lock().failed.push(FailedSpace {
                        key: space.key.clone(),
                        name: space.name.clone(),
                        error: format!("{e:#}"),
                    });
                }
            }

            if let Some(p) = &progress {
                p.inc("spaces");
            }
        });
    });

    if let Some(p) = progress {
        p.finish();
    }

    let mut outcome = outcome.into_inner();
    outcome.interrupted = interrupted.into_inner();
    outcome.spaces.sort_by(|a, b| a.key.cmp(&b.key));
    outcome.failed.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(outcome)
}
