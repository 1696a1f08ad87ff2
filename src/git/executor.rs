//! Git subprocess calls: staging and the final commit.
//!
//! All operations shell out to the system `git` binary so the user's own
//! config, hooks, and signing setup apply.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Stage modifications and deletions of tracked files (`git add --update`).
///
/// Mirrors what `git commit --all` would include.
pub fn stage_tracked(root: &Path) -> Result<(), GitError> {
    run_git(root, &["add", "--update"], "stage tracked changes")?;
    Ok(())
}

/// Create a commit with `message`, forwarding `extra_args` to `git commit`.
pub fn commit(root: &Path, message: &str, extra_args: &[String]) -> Result<(), GitError> {
    let mut args: Vec<&str> = vec!["commit", "-m", message];
    args.extend(extra_args.iter().map(String::as_str));

    run_git(root, &args, "create commit")?;
    Ok(())
}

/// Run a git command in `root` and return its stdout.
pub(crate) fn run_git<S: AsRef<str>>(
    root: &Path,
    args: &[S],
    operation: &str,
) -> Result<String, GitError> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    debug!("git {}", args.join(" "));

    let output = Command::new("git")
        .args(&args)
        .current_dir(root)
        .output()
        .map_err(GitError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(GitError::CommandFailed {
            operation: operation.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
