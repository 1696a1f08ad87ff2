//! Commit message drafting: diff selection, prompts, and response decoding.

pub mod diff;
pub mod prompt;
pub mod request;
pub mod response;

pub use diff::{StagedDiff, get_staged_diff};
pub use prompt::{CommitPrompt, build_prompt};
pub use request::{GenerationRequest, ProjectSignal, PromptConstraints, ResponseFormat, Turn};
pub use response::{Candidate, GenerationResult, ResponseParser};
