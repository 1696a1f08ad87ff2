//! Request data model shared by prompt construction, vendors, and the session.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::commit::diff::StagedDiff;
use crate::error::ConfigError;

/// How the backend is asked to format its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// JSON object with scored candidates and an optional advisory.
    #[default]
    Structured,
    /// Legacy plain text: candidates separated by `---` lines, no scores.
    PlainText,
}

impl ResponseFormat {
    /// Opening text sent as the final assistant turn to prime the backend.
    pub fn primer(&self) -> Option<&'static str> {
        match self {
            ResponseFormat::Structured => Some("{"),
            ResponseFormat::PlainText => None,
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(ResponseFormat::Structured),
            "text" | "plain" => Ok(ResponseFormat::PlainText),
            other => Err(ConfigError::invalid(
                "format",
                format!("Must be `json` or `text`, got `{other}`"),
            )),
        }
    }
}

/// A repository trait that widens the scope vocabulary offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectSignal {
    Nuxt,
    Next,
}

impl ProjectSignal {
    pub const ALL: [ProjectSignal; 2] = [ProjectSignal::Nuxt, ProjectSignal::Next];

    /// Files at the repository root whose presence raises this signal.
    pub fn marker_files(&self) -> &'static [&'static str] {
        match self {
            ProjectSignal::Nuxt => &["nuxt.config.js", "nuxt.config.ts"],
            ProjectSignal::Next => &["next.config.js", "next.config.mjs", "next.config.ts"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectSignal::Nuxt => "Nuxt.js",
            ProjectSignal::Next => "Next.js",
        }
    }
}

impl fmt::Display for ProjectSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Everything besides the diff and history that shapes the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConstraints {
    /// Maximum commit message length in characters.
    pub max_length: usize,
    /// Number of candidates to ask for.
    pub candidate_count: usize,
    /// Free-text hint from the user.
    pub hint: Option<String>,
    /// Preferred conventional commit type, e.g. `fix`.
    pub commit_type: Option<String>,
    /// Repository-specific instruction that outranks the base rules.
    pub additional_instruction: Option<String>,
    pub project_signals: BTreeSet<ProjectSignal>,
    /// Language for the per-candidate explanation, if any.
    pub secondary_language: Option<String>,
    pub format: ResponseFormat,
}

impl Default for PromptConstraints {
    fn default() -> Self {
        Self {
            max_length: 50,
            candidate_count: 1,
            hint: None,
            commit_type: None,
            additional_instruction: None,
            project_signals: BTreeSet::new(),
            secondary_language: None,
            format: ResponseFormat::Structured,
        }
    }
}

/// One assistant/user exchange replayed as context on the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    assistant_text: String,
    user_text: String,
}

impl Turn {
    pub fn new(assistant_text: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            assistant_text: assistant_text.into(),
            user_text: user_text.into(),
        }
    }

    pub fn assistant_text(&self) -> &str {
        &self.assistant_text
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }
}

/// A single vendor call. Built fresh for every generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub diff: Arc<StagedDiff>,
    pub constraints: PromptConstraints,
    pub history: Vec<Turn>,
}

impl GenerationRequest {
    pub fn new(diff: Arc<StagedDiff>, constraints: PromptConstraints, history: Vec<Turn>) -> Self {
        Self {
            diff,
            constraints,
            history,
        }
    }

    pub fn format(&self) -> ResponseFormat {
        self.constraints.format
    }
}
