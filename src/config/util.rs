//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Normalize a site base URL for joining API paths.
///
/// Uses `url` crate for proper parsing. Query string, fragment and trailing
/// slashes are dropped; the context path (e.g. `/wiki`) is kept.
///
/// Returns `None` unless the URL is absolute http(s) with a host
///
/// # Examples
/// ```ignore
/// normalize_base_url("https://acme.atlassian.net/wiki/")   -> Some("https://acme.atlassian.net/wiki")
/// normalize_base_url("http://localhost:8090")              -> Some("http://localhost:8090")
/// normalize_base_url("https://wiki.acme.com/confluence?x") -> Some("https://wiki.acme.com/confluence")
/// normalize_base_url("wiki.acme.com")                      -> None
/// ```
pub fn normalize_base_url(url_str: &str) -> Option<String> {
    let mut parsed = url::Url::parse(url_str.trim()).ok()?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    Some(parsed.as_str().trim_end_matches('/').to_string())
}

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/audits/reports/  ← cwd
/// /home/user/audits/attic.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_from(&cwd, config_name)
}

fn find_config_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

// ============================================================================
// tests
// ============================================================================
