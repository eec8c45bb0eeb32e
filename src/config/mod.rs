//! Audit configuration management for `attic.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── fetch      # [fetch]
//! │   ├── report     # [report]
//! │   └── site       # [site]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # AuditConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section    | Purpose                                          |
//! |------------|--------------------------------------------------|
//! | `[site]`   | Wiki URL, credentials, included/excluded spaces  |
//! | `[fetch]`  | Timeouts, retries, page sizes, version history   |
//! | `[report]` | Output folder, top list size, formats            |
//!
//! The config file is optional: every field has a default and the site URL
//! can come from `--url`.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{FetchConfig, ReportConfig, ReportFormat, SiteConfig, SpaceFilter};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{Cli, Commands, SiteArgs};
use crate::store::HttpConfig;
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing attic.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths are resolved against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Space keys given with `--space` (internal use only)
    #[serde(skip)]
    pub only_spaces: Vec<String>,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

impl AuditConfig {
    /// Load configuration for a command that talks to the wiki.
    ///
    /// Searches upward from cwd for the config file. A missing file is not an
    /// error; CLI flags and defaults are used instead. The root is the config
    /// file's directory, or cwd without one.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_command_options(cli);
        config.normalize_paths();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Audit { args } => {
                self.apply_site_args(&args.site);
                Self::update_option(&mut self.report.output, args.output.as_ref());
                Self::update_option(&mut self.report.top, args.top.as_ref());
                Self::update_option(&mut self.fetch.jobs, args.jobs.as_ref());
                self.only_spaces = args.spaces.clone();
            }
            Commands::Spaces { site } => self.apply_site_args(site),
            // Scan works on local files only
            Commands::Scan { .. } => {}
        }
    }

    fn apply_site_args(&mut self, args: &SiteArgs) {
        crate::logger::set_verbose(args.verbose);

        if let Some(url) = &args.url {
            self.site.url = Some(url.clone());
        }
        if let Some(user) = &args.user {
            self.site.user = Some(user.clone());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve relative paths against the root directory.
    fn normalize_paths(&mut self) {
        let root = self.root.clone();
        self.site.normalize_paths(&root);
        self.report.normalize_paths(&root);
    }

    // ========================================================================
    // derived settings
    // ========================================================================

    /// HTTP client settings, including the API token.
    pub fn http_config(&self) -> Result<HttpConfig> {
        let base_url = self
            .site
            .base_url()
            .ok_or_else(|| ConfigError::Validation("site.url is not set".into()))?;

        let mut http = HttpConfig::new(&base_url);
        http.user = self.site.user.clone();
        http.token = self.site.token()?;
        http.timeout = self.fetch.timeout();
        http.retry_count = self.fetch.retries;
        http.retry_delay = self.fetch.retry_delay();
        Ok(http)
    }

    pub fn space_filter(&self) -> Result<SpaceFilter> {
        Ok(self.site.space_filter(&self.only_spaces)?)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.site.validate(&mut diag);
        self.fetch.validate(&mut diag);
        self.report.validate(&mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AuditConfig {
    let (parsed, ignored) = AuditConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
