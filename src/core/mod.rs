//! Core types - pure abstractions shared across the codebase.

mod link;
mod name;
mod state;

pub use link::AttachmentLink;
pub use name::CanonicalName;
pub use state::{is_shutdown, setup_shutdown_handler};

