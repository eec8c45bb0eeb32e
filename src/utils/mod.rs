//! Small shared helpers: HTML entities, UTC timestamps, sizes, pluralization.

pub mod date;
pub mod html;
mod plural;
mod size;

pub use plural::{plural_count, plural_s};
pub use size::format_size;
