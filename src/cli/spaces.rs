//! `attic spaces`: list the spaces visible to the credentials.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::config::{AuditConfig, SpaceFilter};
use crate::log;
use crate::model::Space;
use crate::store::{ContentStore, HttpClient, RestStore};
use crate::utils::plural_count;

pub fn list_spaces(config: &AuditConfig) -> Result<()> {
    let http = HttpClient::new(config.http_config()?)?;
    let store = RestStore::new(http, config.fetch.store_options());
    let filter = config.space_filter()?;

    let spaces = collect(&store, &filter)?;
    let width = spaces.iter().map(|(s, _)| s.key.len()).max().unwrap_or(0);
    for (space, selected) in &spaces {
        let key = format!("{:width$}", space.key);
        if *selected {
            println!("{} {}", key.cyan(), space.name);
        } else {
            println!("{} {}", key.dimmed(), format!("{} (excluded)", space.name).dimmed());
        }
    }

    let selected = spaces.iter().filter(|(_, s)| *s).count();
    log!("spaces"; "{}, {} selected for audit", plural_count(spaces.len(), "space"), selected);
    Ok(())
}

/// Every visible space sorted by key, flagged with whether an audit would include it.
fn collect<S: ContentStore + ?Sized>(store: &S, filter: &SpaceFilter) -> Result<Vec<(Space, bool)>> {
    let mut spaces: Vec<Space> = store
        .list_spaces()
        .collect::<Result<_, _>>()
        .context("failed to list spaces")?;
    spaces.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(spaces
        .into_iter()
        .map(|s| {
            let selected = filter.matches(&s.key);
            (s, selected)
        })
        .collect())
}
