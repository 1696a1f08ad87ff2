//! Staged diff selection.
//!
//! Shells out to `git diff --cached` so pathspec exclusion magic and the
//! whitespace-insensitive, widened-context comparison behave exactly like
//! the user's own git.

use std::path::Path;

use tracing::debug;

use crate::error::GitError;
use crate::git::executor::run_git;

/// Lock files and generated files that never belong in a prompt.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "package-lock.json",
    "pnpm-lock.yaml",
    "*.generated.*",
    // yarn.lock, Cargo.lock, Gemfile.lock, Pipfile.lock, ...
    "*.lock",
];

/// Lines of context around each hunk.
const CONTEXT_LINES: u32 = 10;

/// Staged changes selected for a prompt.
///
/// The file list is never empty and holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDiff {
    files: Vec<String>,
    text: String,
}

impl StagedDiff {
    /// Build a diff from a file list and unified diff text.
    ///
    /// Returns `None` when no file paths remain after trimming and
    /// deduplication.
    pub fn new<I, S>(files: I, text: impl Into<String>) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for file in files {
            let file = file.as_ref().trim();
            if !file.is_empty() && !unique.iter().any(|f| f == file) {
                unique.push(file.to_string());
            }
        }

        if unique.is_empty() {
            return None;
        }

        Some(Self {
            files: unique,
            text: text.into(),
        })
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// The unified diff text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// "Detected N staged file(s)" banner line.
    pub fn detected_message(&self) -> String {
        let count = self.files.len();
        format!(
            "Detected {} staged file{}",
            count,
            if count > 1 { "s" } else { "" }
        )
    }
}

fn exclude_pathspec(pattern: &str) -> String {
    format!(":(exclude){pattern}")
}

fn diff_args(extra: &[&str], exclude_patterns: &[String]) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "diff".to_string(),
        format!("-U{CONTEXT_LINES}"),
        "-w".to_string(),
        "--cached".to_string(),
        "--diff-algorithm=minimal".to_string(),
    ];
    args.extend(extra.iter().map(|a| a.to_string()));
    args.push("--".to_string());
    args.extend(DEFAULT_EXCLUDES.iter().map(|p| exclude_pathspec(p)));
    args.extend(exclude_patterns.iter().map(|p| exclude_pathspec(p)));
    args
}

/// Collect the staged diff of the repository at `root`.
///
/// The built-in lock-file patterns are always excluded in addition to
/// `exclude_patterns`. Returns `Ok(None)` when nothing is staged after
/// exclusion.
pub fn get_staged_diff(
    root: &Path,
    exclude_patterns: &[String],
) -> Result<Option<StagedDiff>, GitError> {
    let name_args = diff_args(&["--name-only"], exclude_patterns);
    let names = run_git(root, &name_args, "list staged files")?;

    if names.trim().is_empty() {
        debug!("No staged files after excluding {:?}", exclude_patterns);
        return Ok(None);
    }

    let text_args = diff_args(&[], exclude_patterns);
    let text = run_git(root, &text_args, "collect staged diff")?;

    let diff = StagedDiff::new(names.lines(), text);
    if let Some(ref d) = diff {
        debug!(
            "Selected {} staged files ({} diff bytes)",
            d.files().len(),
            d.text().len()
        );
    }
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_diff_rejects_empty_file_list() {
        assert!(StagedDiff::new(Vec::<String>::new(), "diff").is_none());
        assert!(StagedDiff::new(["", "  "], "diff").is_none());
    }

    #[test]
    fn test_staged_diff_deduplicates_preserving_order() {
        let diff = StagedDiff::new(["b.rs", "a.rs", "b.rs"], "text").unwrap();
        assert_eq!(diff.files(), ["b.rs", "a.rs"]);
    }

    #[test]
    fn test_detected_message_pluralises() {
        let one = StagedDiff::new(["a.rs"], "").unwrap();
        let two = StagedDiff::new(["a.rs", "b.rs"], "").unwrap();
        assert_eq!(one.detected_message(), "Detected 1 staged file");
        assert_eq!(two.detected_message(), "Detected 2 staged files");
    }

    #[test]
    fn test_diff_args_widen_context_and_ignore_whitespace() {
        let args = diff_args(&[], &[]);
        assert!(args.contains(&"-U10".to_string()));
        assert!(args.contains(&"-w".to_string()));
        assert!(args.contains(&"--cached".to_string()));
    }

    #[test]
    fn test_diff_args_union_builtin_and_caller_excludes() {
        let args = diff_args(&["--name-only"], &["docs/**".to_string()]);
        let separator = args.iter().position(|a| a == "--").unwrap();
        let pathspecs = &args[separator + 1..];
        assert!(pathspecs.contains(&":(exclude)*.lock".to_string()));
        assert!(pathspecs.contains(&":(exclude)package-lock.json".to_string()));
        assert!(pathspecs.contains(&":(exclude)docs/**".to_string()));
        assert_eq!(pathspecs.len(), DEFAULT_EXCLUDES.len() + 1);
    }
}
