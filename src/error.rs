//! Error types for aicommits modules using thiserror.

use thiserror::Error;

/// Maximum number of raw response characters echoed in a decode error message.
const RAW_PREVIEW_CHARS: usize = 500;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("The current directory must be a Git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("Repository has no working directory (bare repositories are not supported)")]
    BareRepository,

    #[error("git executable not found in PATH")]
    NotInstalled,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git failed to {operation}: {stderr}")]
    CommandFailed { operation: String, stderr: String },
}

/// Errors from configuration validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid config property {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Missing {vendor} credentials. Set the {env_var} environment variable")]
    MissingCredential {
        vendor: &'static str,
        env_var: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// A vendor response that could not be decoded into candidates.
///
/// The raw text is kept so it can be shown to the user or logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not decode commit messages: {reason}. Response: {}", preview(.raw))]
pub struct DecodeError {
    reason: String,
    raw: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The exact text the vendor returned.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() > RAW_PREVIEW_CHARS {
        let head: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
        format!("{head}…")
    } else {
        raw.to_string()
    }
}

/// Errors from a single vendor request.
#[derive(Error, Debug)]
pub enum VendorError {
    #[error("Could not reach {vendor} at {host}. Check your network connection")]
    NetworkUnavailable { vendor: &'static str, host: String },

    #[error("{vendor} API error ({status}): {body}")]
    Http {
        vendor: &'static str,
        status: u16,
        body: String,
    },

    #[error("{vendor} request timed out after {secs} seconds")]
    Timeout { vendor: &'static str, secs: u64 },

    #[error("{vendor} request failed: {source}")]
    Request {
        vendor: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Top-level errors from commit message drafting.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Commit cancelled")]
    Cancelled,

    #[error(
        "No staged changes found. Stage your changes manually, or automatically stage all changes with the `--all` flag"
    )]
    NoStagedChanges,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("Terminal prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
}

impl CommitError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommitError::Cancelled)
    }
}
