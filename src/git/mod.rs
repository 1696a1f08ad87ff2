//! Repository discovery and git subprocess calls.

pub mod executor;
pub mod workspace;

pub use executor::{commit, stage_tracked};
pub use workspace::{PROMPT_TITLE_FILE, Workspace};
