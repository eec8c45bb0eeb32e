//! attic - audit wiki attachment storage.
//!
//! Finds every attachment that no page embeds or links anymore, ranks the
//! largest files of each space and writes CSV/HTML/JSON reports.

mod audit;
mod cli;
mod config;
mod core;
mod embed;
mod index;
mod logger;
mod model;
mod report;
mod scan;
mod store;
mod usage;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AuditConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match &cli.command {
        // Local file only, no site configuration needed
        Commands::Scan { file, page_id, json } => cli::scan::scan_file(file, page_id, *json),
        Commands::Spaces { .. } => cli::spaces::list_spaces(&AuditConfig::load(&cli)?),
        Commands::Audit { .. } => {
            let summary = cli::audit::run_audit(&AuditConfig::load(&cli)?)?;
            if !summary.failed.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
