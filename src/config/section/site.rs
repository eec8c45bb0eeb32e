//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://acme.atlassian.net/wiki"
//! user = "me@acme.com"
//! token_env = "ATTIC_API_TOKEN"        # env var holding the API token
//! token_path = "~/.config/attic/token" # alternative; tilde-expanded
//! include_spaces = ["^ENG"]            # regex on space keys
//! exclude_spaces = ["^~"]              # skip personal spaces
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::util::normalize_base_url;
use crate::config::{ConfigDiagnostics, ConfigError, FieldPath};

/// Wiki connection and space selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site base URL including any context path (e.g. `/wiki`).
    pub url: Option<String>,

    /// Account name for basic authentication.
    pub user: Option<String>,

    /// Environment variable holding the API token.
    pub token_env: String,

    /// File holding the API token. Takes precedence over `token_env`.
    ///
    /// # Security
    /// - Store outside any repository
    pub token_path: Option<PathBuf>,

    /// Only audit spaces whose key matches one of these patterns.
    pub include_spaces: Vec<String>,

    /// Never audit spaces whose key matches one of these patterns.
    pub exclude_spaces: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            token_env: "ATTIC_API_TOKEN".to_string(),
            token_path: None,
            include_spaces: Vec::new(),
            exclude_spaces: Vec::new(),
        }
    }
}

pub struct SiteConfigFields {
    pub url: FieldPath,
    pub user: FieldPath,
    pub token_env: FieldPath,
    pub token_path: FieldPath,
    pub include_spaces: FieldPath,
    pub exclude_spaces: FieldPath,
}

impl SiteConfig {
    pub const FIELDS: SiteConfigFields = SiteConfigFields {
        url: FieldPath::new("site.url"),
        user: FieldPath::new("site.user"),
        token_env: FieldPath::new("site.token_env"),
        token_path: FieldPath::new("site.token_path"),
        include_spaces: FieldPath::new("site.include_spaces"),
        exclude_spaces: FieldPath::new("site.exclude_spaces"),
    };

    /// Normalized base URL (no trailing slash, query or fragment).
    pub fn base_url(&self) -> Option<String> {
        self.url.as_deref().and_then(normalize_base_url)
    }

    /// Resolve relative/tilde token path against the config root.
    pub fn normalize_paths(&mut self, root: &Path) {
        if let Some(path) = self.token_path.take() {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            let path = PathBuf::from(expanded);
            self.token_path = Some(if path.is_relative() { root.join(path) } else { path });
        }
    }

    /// Read the API token. `None` means anonymous access.
    pub fn token(&self) -> Result<Option<String>, ConfigError> {
        if let Some(path) = &self.token_path {
            let token = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.clone(), e))?;
            let token = token.trim();
            return Ok((!token.is_empty()).then(|| token.to_string()));
        }
        if self.token_env.is_empty() {
            return Ok(None);
        }
        Ok(std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    /// Build the space filter. `only` restricts to explicit keys (CLI `--space`).
    pub fn space_filter(&self, only: &[String]) -> Result<SpaceFilter, regex::Error> {
        Ok(SpaceFilter {
            include: compile_all(&self.include_spaces)?,
            exclude: compile_all(&self.exclude_spaces)?,
            only: only.to_vec(),
        })
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        match self.url.as_deref() {
            None | Some("") => diag.error_with_hint(
                Self::FIELDS.url,
                "site URL is required",
                "set `url` under [site] or pass --url",
            ),
            Some(url) if self.base_url().is_none() => diag.error(
                Self::FIELDS.url,
                format!("not an http(s) URL: {url}"),
            ),
            Some(_) => {}
        }

        if let Some(path) = &self.token_path
            && !path.is_file()
        {
            diag.error(
                Self::FIELDS.token_path,
                format!("token file not found: {}", path.display()),
            );
        }

        if self.user.is_none() {
            diag.warn(Self::FIELDS.user, "no user set, requests are sent without basic auth");
        }

        for (field, patterns) in [
            (Self::FIELDS.include_spaces, &self.include_spaces),
            (Self::FIELDS.exclude_spaces, &self.exclude_spaces),
        ] {
            for pattern in patterns {
                if let Err(e) = Regex::new(pattern) {
                    diag.error(field, format!("invalid pattern `{pattern}`: {e}"));
                }
            }
        }
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

/// Decides which spaces an audit run covers.
#[derive(Debug, Clone, Default)]
pub struct SpaceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    only: Vec<String>,
}

impl SpaceFilter {
    pub fn matches(&self, key: &str) -> bool {
        if !self.only.is_empty() && !self.only.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            return false;
        }
        if !self.include.is_empty() && !self.include.iter().any(|r| r.is_match(key)) {
            return false;
        }
        !self.exclude.iter().any(|r| r.is_match(key))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_site_config() {
        let config = test_parse_config(
            r#"[site]
url = "https://acme.atlassian.net/wiki/"
user = "me@acme.com"
token_env = "MY_TOKEN"
include_spaces = ["^ENG", "^OPS$"]
exclude_spaces = ["^~"]"#,
        );

        assert_eq!(config.site.base_url().as_deref(), Some("https://acme.atlassian.net/wiki"));
        assert_eq!(config.site.user.as_deref(), Some("me@acme.com"));
        assert_eq!(config.site.token_env, "MY_TOKEN");
        assert_eq!(config.site.include_spaces.len(), 2);
    }

    #[test]
    fn test_site_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.site.token_env, "ATTIC_API_TOKEN");
        assert!(config.site.token_path.is_none());
        assert!(config.site.exclude_spaces.is_empty());
    }

    #[test]
    fn test_space_filter() {
        let config = test_parse_config(
            "[site]\nurl = \"https://w.example\"\ninclude_spaces = [\"^ENG\", \"^~\"]\nexclude_spaces = [\"^~bot\"]",
        );
        let filter = config.site.space_filter(&[]).unwrap();
        assert!(filter.matches("ENG"));
        assert!(filter.matches("ENGDOCS"));
        assert!(filter.matches("~alice"));
        assert!(!filter.matches("~bot1"));
        assert!(!filter.matches("HR"));

        let only = config.site.space_filter(&["eng".to_string()]).unwrap();
        assert!(only.matches("ENG"));
        assert!(!only.matches("ENGDOCS"));
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let config = test_parse_config("");
        let filter = config.site.space_filter(&[]).unwrap();
        assert!(filter.matches("ANY"));
        assert!(filter.matches("~personal"));
    }

    #[test]
    fn test_token_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  s3cret\n").unwrap();

        let mut config = test_parse_config("[site]\ntoken_path = \"token\"");
        config.site.normalize_paths(dir.path());

        assert_eq!(config.site.token_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.site.token().unwrap().as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_token_missing_env_is_anonymous() {
        let config = test_parse_config("[site]\ntoken_env = \"ATTIC_TEST_TOKEN_THAT_IS_NEVER_SET\"");
        assert!(config.site.token().unwrap().is_none());
    }
}
