//! aicommits - Draft git commit messages with an LLM and refine them interactively.
//!
//! # Overview
//!
//! aicommits reads the staged diff, asks one of several LLM vendors for
//! scored commit message candidates, and lets the user pick, regenerate, or
//! refine them before committing. Refinement requests are replayed to the
//! model as conversation history.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod session;

// Re-export commonly used types
pub use commit::{Candidate, GenerationRequest, GenerationResult, PromptConstraints, StagedDiff, Turn};
pub use config::{Config, ConfigOverrides};
pub use error::{CommitError, ConfigError, DecodeError, GitError, VendorError};
pub use llm::{ModelTier, Vendor, VendorKind};
pub use session::{RefinementSession, SessionState};
