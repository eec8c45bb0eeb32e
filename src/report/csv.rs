//! RFC 4180 CSV output.

use std::borrow::Cow;
use std::io::{self, Write};

use super::row::{ReportRow, megabytes, yes_no};
use crate::usage::UsageRow;

pub const HEADER: [&str; 14] = [
    "filename",
    "bytes",
    "mb",
    "versions",
    "last_modified",
    "download_url",
    "owner_page",
    "owner_page_url",
    "embedded",
    "linked_on_owner",
    "linked_from",
    "attachments_page_url",
    "api_delete_url",
    "verdict",
];

/// Write a header and one record per row. Records end with CRLF.
pub fn write<'a, W: Write>(
    out: &mut W,
    rows: impl IntoIterator<Item = &'a UsageRow>,
    base_url: &str,
) -> io::Result<()> {
    write_record(out, HEADER)?;

    for row in rows {
        let r = ReportRow::new(row, base_url);
        let owner = r.owner();
        let evidence = &row.usage.evidence;
        let bytes = r.bytes().to_string();
        let mb = megabytes(r.bytes());
        let versions = row.item.version_count().to_string();
        let last_modified = r.last_modified();
        let download_url = r.download_url();
        let owner_url = r.page_url(owner);
        let linked_from = r.linked_from_text();
        let attachments_page = r.attachments_page_url();
        let api_delete = r.api_delete_url();
        write_record(
            out,
            [
                r.filename(),
                bytes.as_str(),
                mb.as_str(),
                versions.as_str(),
                last_modified.as_str(),
                download_url.as_str(),
                owner.title.as_str(),
                owner_url.as_str(),
                yes_no(evidence.embedded),
                yes_no(evidence.linked_on_owner),
                linked_from.as_str(),
                attachments_page.as_str(),
                api_delete.as_str(),
                row.usage.verdict.as_str(),
            ],
        )?;
    }
    Ok(())
}

fn write_record<'a, W: Write>(out: &mut W, fields: impl IntoIterator<Item = &'a str>) -> io::Result<()> {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        out.write_all(quote(field).as_bytes())?;
    }
    out.write_all(b"\r\n")
}

/// Quote a field when it contains a separator, quote or line break.
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
