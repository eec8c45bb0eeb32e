//! Attachment usage: per-attachment verdicts and per-space aggregation.

mod aggregate;
mod classify;

pub use aggregate::{SpaceReport, UsageRow, aggregate};
pub use classify::{PageLink, classify};
#[cfg(test)]
pub use classify::{Evidence, Usage, Verdict};
