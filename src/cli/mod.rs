//! Command-line interface module.

mod args;
pub mod audit;
pub mod scan;
pub mod spaces;

pub use args::{Cli, Commands, SiteArgs};
