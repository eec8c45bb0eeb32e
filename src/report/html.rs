//! HTML report pages.
//!
//! Every interpolated value goes through `escape`/`escape_attr`; wiki
//! content never reaches the page unescaped.

use std::fmt::Write;

use super::row::{ReportRow, megabytes, yes_no};
use super::summary::RunSummary;
use crate::embed::report::{PAGE_HTML, PageVars};
use crate::usage::{SpaceReport, UsageRow};
use crate::utils::html::{escape, escape_attr};

/// Which rows a space page lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// The `top` largest attachments
    Top,
    /// Every unreferenced attachment
    Unreferenced,
}

/// Render one space page.
pub fn space_page(report: &SpaceReport, listing: Listing, base_url: &str) -> String {
    let space = &report.space;
    let (title, rows): (String, Vec<&UsageRow>) = match listing {
        Listing::Top => (
            format!("{} ({}) attachments", space.name, space.key),
            report.top_attachments().iter().collect(),
        ),
        Listing::Unreferenced => (
            format!("{} ({}) unreferenced attachments", space.name, space.key),
            report.unreferenced().collect(),
        ),
    };

    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape(&title));
    let _ = writeln!(
        body,
        "<p class=\"meta\">{} files, {} MB total, {} unreferenced ({} MB). Showing {} rows.</p>",
        report.file_count(),
        megabytes(report.total_bytes),
        report.unreferenced_count(),
        megabytes(report.unreferenced_bytes),
        rows.len()
    );

    body.push_str(concat!(
        "<table class=\"sortable\">\n<thead>\n<tr>",
        "<th>Filename</th><th>Size</th><th>Versions</th><th>Last modified</th><th>Owning page</th>",
        "<th>Embedded</th><th>Linked on owner</th><th>Linked from other pages</th>",
        "<th>Verdict</th><th>Download</th><th>Attachments page</th><th>API delete</th>",
        "</tr>\n</thead>\n<tbody>\n"
    ));
    for row in rows {
        push_row(&mut body, &ReportRow::new(row, base_url));
    }
    body.push_str("</tbody>\n</table>\n");

    PAGE_HTML.render(&PageVars { title, body })
}

fn push_row(body: &mut String, r: &ReportRow<'_>) {
    let evidence = &r.row.usage.evidence;
    let verdict = r.row.usage.verdict.as_str();

    let linked_from = r
        .linked_from()
        .iter()
        .map(|p| link(&r.page_url(p), &p.title))
        .collect::<Vec<_>>()
        .join("<br>");

    let _ = writeln!(
        body,
        concat!(
            "<tr class=\"{verdict}\"><td>{name}</td><td class=\"num\" data-sort=\"{bytes}\">{mb} MB</td>",
            "<td class=\"num\">{versions}</td><td>{modified}</td><td>{owner}</td>",
            "<td>{embedded}</td><td>{linked_on_owner}</td><td>{linked_from}</td><td>{verdict}</td>",
            "<td>{download}</td><td>{manage}</td><td>{delete}</td></tr>"
        ),
        verdict = verdict,
        name = escape(r.filename()),
        bytes = r.bytes(),
        mb = megabytes(r.bytes()),
        versions = r.row.item.version_count(),
        modified = escape(&r.last_modified()),
        owner = link(&r.page_url(r.owner()), &r.owner().title),
        embedded = yes_no(evidence.embedded),
        linked_on_owner = yes_no(evidence.linked_on_owner),
        linked_from = linked_from,
        download = link(&r.download_url(), "Download"),
        manage = link(&r.attachments_page_url(), "Attachments"),
        delete = link(&r.api_delete_url(), "API"),
    );
}

/// Render the run overview (`index.html`).
pub fn overview_page(summary: &RunSummary) -> String {
    let title = format!("Attachment audit {}", summary.started.to_display());

    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape(&title));
    let _ = writeln!(
        body,
        "<p class=\"meta\">Site: {}{}</p>",
        escape(&summary.base_url),
        if summary.interrupted { " (interrupted)" } else { "" }
    );

    body.push_str(concat!(
        "<table class=\"sortable\">\n<thead>\n<tr>",
        "<th>Space</th><th>Key</th><th>Total size</th><th>Files</th>",
        "<th>Unreferenced</th><th>Unreferenced size</th><th>Reports</th>",
        "</tr>\n</thead>\n<tbody>\n"
    ));
    for space in &summary.spaces {
        let mut reports = Vec::new();
        for (href, label) in [(&space.attachments_html, "Attachments"), (&space.unreferenced_html, "Unreferenced")] {
            if let Some(href) = href {
                reports.push(link(href, label));
            }
        }
        let _ = writeln!(
            body,
            concat!(
                "<tr><td>{name}</td><td>{key}</td><td class=\"num\" data-sort=\"{bytes}\">{mb} MB</td>",
                "<td class=\"num\">{files}</td><td class=\"num\">{unref}</td>",
                "<td class=\"num\" data-sort=\"{unref_bytes}\">{unref_mb} MB</td><td>{reports}</td></tr>"
            ),
            name = escape(&space.name),
            key = escape(&space.key),
            bytes = space.total_bytes,
            mb = megabytes(space.total_bytes),
            files = space.file_count,
            unref = space.unreferenced_count,
            unref_bytes = space.unreferenced_bytes,
            unref_mb = megabytes(space.unreferenced_bytes),
            reports = reports.join(" | "),
        );
    }
    body.push_str("</tbody>\n</table>\n");

    if !summary.failed.is_empty() {
        body.push_str("<h2>Failed spaces</h2>\n<ul>\n");
        for failed in &summary.failed {
            let _ = writeln!(
                body,
                "<li>{} ({}): {}</li>",
                escape(&failed.name),
                escape(&failed.key),
                escape(&failed.error)
            );
        }
        body.push_str("</ul>\n");
    }

    PAGE_HTML.render(&PageVars { title, body })
}

fn link(href: &str, text: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\">{}</a>",
        escape_attr(href),
        escape(text)
    )
}
