//! Per-space totals and deterministic ranking.

use std::cmp::Ordering;

use serde::Serialize;

use super::classify::{Usage, Verdict};
use crate::index::IndexStats;
use crate::model::{Space, VersionedAttachment};

/// One attachment with its verdict, ready for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct UsageRow {
    #[serde(flatten)]
    pub item: VersionedAttachment,
    #[serde(flatten)]
    pub usage: Usage,
}

impl UsageRow {
    #[inline]
    pub fn size(&self) -> u64 {
        self.item.attachment.size
    }

    #[inline]
    pub fn is_unreferenced(&self) -> bool {
        self.usage.verdict == Verdict::Unreferenced
    }
}

/// Everything known about one space after analysis.
#[derive(Debug, Clone)]
pub struct SpaceReport {
    pub space: Space,
    /// All attachments, ranked
    pub rows: Vec<UsageRow>,
    pub top: usize,
    pub total_bytes: u64,
    pub unreferenced_bytes: u64,
    pub page_count: usize,
    pub index: IndexStats,
}

impl SpaceReport {
    /// Up to `top` largest attachments.
    pub fn top_attachments(&self) -> &[UsageRow] {
        &self.rows[..self.top.min(self.rows.len())]
    }

    /// Every unreferenced attachment, in rank order.
    pub fn unreferenced(&self) -> impl Iterator<Item = &UsageRow> {
        self.rows.iter().filter(|r| r.is_unreferenced())
    }

    pub fn file_count(&self) -> usize {
        self.rows.len()
    }

    pub fn unreferenced_count(&self) -> usize {
        self.unreferenced().count()
    }
}

/// Summarize classified attachments of one space.
pub fn aggregate(space: Space, mut rows: Vec<UsageRow>, top: usize, page_count: usize, index: IndexStats) -> SpaceReport {
    rows.sort_by(rank);

    let total_bytes = rows.iter().map(UsageRow::size).sum();
    let unreferenced_bytes = rows
        .iter()
        .filter(|r| r.is_unreferenced())
        .map(UsageRow::size)
        .sum();

    SpaceReport {
        space,
        rows,
        top,
        total_bytes,
        unreferenced_bytes,
        page_count,
        index,
    }
}

/// Size descending, then filename, owner id and attachment id ascending.
fn rank(a: &UsageRow, b: &UsageRow) -> Ordering {
    let (x, y) = (&a.item.attachment, &b.item.attachment);
    y.size
        .cmp(&x.size)
        .then_with(|| x.filename.cmp(&y.filename))
        .then_with(|| x.owner.cmp(&y.owner))
        .then_with(|| x.id.cmp(&y.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, PageId};
    use crate::usage::classify::{Evidence, PageLink};

    fn row(id: &str, owner: &str, file: &str, size: u64, verdict: Verdict) -> UsageRow {
        UsageRow {
            item: VersionedAttachment::current_only(Attachment::new(id, owner, file, size), 1),
            usage: Usage {
                verdict,
                evidence: Evidence {
                    owner: PageLink {
                        id: PageId::new(owner),
                        title: String::new(),
                        webui: None,
                    },
                    embedded: false,
                    linked_on_owner: false,
                    linked_from: Vec::new(),
                    versions: Vec::new(),
                },
            },
        }
    }

    fn ids(rows: &[UsageRow]) -> Vec<&str> {
        rows.iter().map(|r| r.item.attachment.id.as_str()).collect()
    }

    #[test]
    fn test_totals_and_top() {
        let rows = vec![
            row("a", "1", "a.png", 100, Verdict::Used),
            row("b", "1", "b.png", 300, Verdict::Unreferenced),
            row("c", "2", "c.png", 200, Verdict::Unreferenced),
        ];
        let report = aggregate(Space::new("DOC", "Docs"), rows, 2, 2, IndexStats::default());

        assert_eq!(report.total_bytes, 600);
        assert_eq!(report.unreferenced_bytes, 500);
        assert_eq!(report.file_count(), 3);
        assert_eq!(report.unreferenced_count(), 2);
        assert_eq!(ids(report.top_attachments()), vec!["b", "c"]);
        let unref: Vec<_> = report.unreferenced().map(|r| r.item.attachment.id.as_str()).collect();
        assert_eq!(unref, vec!["b", "c"]);
    }

    #[test]
    fn test_ties_break_deterministically() {
        let rows = vec![
            row("z", "2", "same.png", 50, Verdict::Used),
            row("y", "1", "same.png", 50, Verdict::Used),
            row("x", "1", "same.png", 50, Verdict::Used),
            row("w", "9", "alpha.png", 50, Verdict::Used),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = aggregate(Space::new("DOC", "Docs"), rows, 10, 0, IndexStats::default());
        let b = aggregate(Space::new("DOC", "Docs"), reversed, 10, 0, IndexStats::default());
        assert_eq!(ids(&a.rows), vec!["w", "x", "y", "z"]);
        assert_eq!(ids(&a.rows), ids(&b.rows));
    }

    #[test]
    fn test_top_larger_than_space() {
        let rows = vec![row("a", "1", "a.png", 1, Verdict::Used)];
        let report = aggregate(Space::new("DOC", "Docs"), rows, 100, 1, IndexStats::default());
        assert_eq!(report.top_attachments().len(), 1);
    }

    #[test]
    fn test_empty_space() {
        let report = aggregate(Space::new("DOC", "Docs"), Vec::new(), 100, 0, IndexStats::default());
        assert_eq!(report.total_bytes, 0);
        assert!(report.top_attachments().is_empty());
        assert_eq!(report.unreferenced_count(), 0);
    }
}
