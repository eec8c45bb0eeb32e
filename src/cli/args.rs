//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Audit wiki attachment storage
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: attic.toml)
    #[arg(short = 'C', long, default_value = "attic.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Audit attachments of every selected space and write reports
    #[command(visible_alias = "a")]
    Audit {
        #[command(flatten)]
        args: AuditArgs,
    },

    /// List spaces visible to the configured credentials
    Spaces {
        #[command(flatten)]
        site: SiteArgs,
    },

    /// Print attachment references found in a local storage-format file
    Scan {
        /// File holding a page body in storage format
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Id of the page the body belongs to
        #[arg(long, default_value = "0")]
        page_id: String,

        /// Print references as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Connection arguments shared by commands that talk to the wiki.
#[derive(clap::Args, Debug, Clone)]
pub struct SiteArgs {
    /// Override site base URL, including the context path
    ///
    /// Example: attic audit --url "https://acme.atlassian.net/wiki"
    #[arg(short = 'U', long, value_hint = clap::ValueHint::Url)]
    pub url: Option<String>,

    /// Override account name for basic authentication
    #[arg(short, long)]
    pub user: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Audit command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct AuditArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Report parent directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Number of largest attachments listed per space
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Spaces processed in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Only audit this space key (repeatable)
    #[arg(short, long = "space", value_name = "KEY")]
    pub spaces: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audit() {
        let cli = Cli::parse_from([
            "attic", "-C", "other.toml", "audit", "-U", "https://w.example", "-s", "DOC", "--space", "OPS", "-V",
        ]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        let Commands::Audit { args } = cli.command else {
            panic!("expected audit");
        };
        assert_eq!(args.site.url.as_deref(), Some("https://w.example"));
        assert_eq!(args.spaces, vec!["DOC", "OPS"]);
        assert!(args.site.verbose);
        assert!(args.top.is_none());
    }

    #[test]
    fn test_parse_scan_defaults() {
        let cli = Cli::parse_from(["attic", "scan", "body.xml"]);
        assert_eq!(cli.config, PathBuf::from("attic.toml"));
        let Commands::Scan { file, page_id, json } = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(file, PathBuf::from("body.xml"));
        assert_eq!(page_id, "0");
        assert!(!json);
    }

    #[test]
    fn test_global_color_after_subcommand() {
        let cli = Cli::parse_from(["attic", "spaces", "--color", "never"]);
        assert!(matches!(cli.color, ColorChoice::Never));
    }
}
