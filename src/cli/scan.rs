//! `attic scan`: run the markup scanner on a local body file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::log;
use crate::model::PageId;
use crate::scan::{AttachmentRef, Owner, PageRefs, scan_page};
use crate::utils::plural_count;

/// Print the references found in `file`, attributed to `page_id`.
pub fn scan_file(file: &Path, page_id: &str, json: bool) -> Result<()> {
    let body = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let refs = scan_page(&PageId::new(page_id), &body).with_context(|| file.display().to_string())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&refs)?);
        return Ok(());
    }

    for line in render(&refs) {
        println!("{line}");
    }
    log!("scan"; "{}", plural_count(refs.len(), "reference"));
    Ok(())
}

/// One line per reference, embedded first.
fn render(refs: &PageRefs) -> Vec<String> {
    let embedded = refs.embedded.iter().map(|r| (format!("{}", "embedded".green()), r));
    let linked = refs.linked.iter().map(|r| (format!("{}", "linked  ".cyan()), r));
    embedded
        .chain(linked)
        .map(|(kind, r)| format!("{kind} {}", describe(r)))
        .collect()
}

fn describe(r: &AttachmentRef) -> String {
    let owner = match &r.owner {
        Owner::Page { id } => format!("page {id}"),
        Owner::Titled {
            title,
            space_key: Some(space),
        } => format!("\"{title}\" in {space}"),
        Owner::Titled { title, space_key: None } => format!("\"{title}\""),
    };
    match r.version {
        Some(v) => format!("{} (v{v}) on {owner}", r.name),
        None => format!("{} on {owner}", r.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lines() {
        let body = concat!(
            r#"<ac:image><ri:attachment ri:filename="Chart.PNG"/></ac:image>"#,
            r#"<a href="/download/attachments/42/manual.pdf?version=3">manual</a>"#,
            r#"<ac:link><ri:attachment ri:filename="notes.txt"><ri:page ri:content-title="Other" ri:space-key="OPS"/></ri:attachment></ac:link>"#,
        );
        let refs = scan_page(&PageId::new("7"), body).unwrap();
        let lines = render(&refs);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("chart.png on page 7"));
        assert!(lines.iter().any(|l| l.ends_with("manual.pdf (v3) on page 42")));
        assert!(lines.iter().any(|l| l.ends_with("notes.txt on \"Other\" in OPS")));
    }

    #[test]
    fn test_scan_file_reads_body() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("body.xml");
        fs::write(&path, r#"<p><a href="/download/attachments/1/a.png">a</a></p>"#).unwrap();
        assert!(scan_file(&path, "1", true).is_ok());
        assert!(scan_file(&tmp.path().join("missing.xml"), "1", false).is_err());
    }
}
