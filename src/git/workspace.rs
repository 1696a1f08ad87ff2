//! Repository discovery and repository-level inputs to the prompt.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::commit::request::ProjectSignal;
use crate::error::GitError;

/// File under the git directory whose content becomes the additional instruction.
pub const PROMPT_TITLE_FILE: &str = "prompt-title";

/// The repository the tool was started in.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    git_dir: PathBuf,
}

impl Workspace {
    /// Find the repository containing `start` and check that git is usable.
    pub fn discover(start: &Path) -> Result<Self, GitError> {
        if which::which("git").is_err() {
            return Err(GitError::NotInstalled);
        }

        let repo = Repository::discover(start).map_err(GitError::NotARepository)?;
        let root = repo
            .workdir()
            .ok_or(GitError::BareRepository)?
            .to_path_buf();
        let git_dir = repo.path().to_path_buf();

        debug!("Repository root: {}", root.display());
        Ok(Self { root, git_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Read a prompt file from the git directory, trimmed.
    ///
    /// Missing, unreadable, or blank files yield `None`.
    pub fn read_prompt_file(&self, name: &str) -> Option<String> {
        let content = std::fs::read_to_string(self.git_dir.join(name)).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Detect project signals from marker files at the repository root.
    pub fn detect_signals(&self) -> BTreeSet<ProjectSignal> {
        ProjectSignal::ALL
            .into_iter()
            .filter(|signal| {
                signal
                    .marker_files()
                    .iter()
                    .any(|file| self.root.join(file).exists())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let ws = Workspace::discover(dir.path()).unwrap();
        (dir, ws)
    }

    #[test]
    fn test_discover_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Workspace::discover(dir.path());
        assert!(matches!(result, Err(GitError::NotARepository(_))));
    }

    #[test]
    fn test_discover_from_subdirectory_finds_root() {
        let (dir, _) = init_workspace();
        let nested = dir.path().join("src/nested");
        std::fs::create_dir_all(&nested).unwrap();

        let ws = Workspace::discover(&nested).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_detect_nuxt_signal() {
        let (dir, ws) = init_workspace();
        assert!(ws.detect_signals().is_empty());

        std::fs::write(dir.path().join("nuxt.config.ts"), "export default {}\n").unwrap();
        let signals = ws.detect_signals();
        assert!(signals.contains(&ProjectSignal::Nuxt));
        assert!(!signals.contains(&ProjectSignal::Next));
    }

    #[test]
    fn test_read_prompt_file() {
        let (_dir, ws) = init_workspace();
        assert_eq!(ws.read_prompt_file(PROMPT_TITLE_FILE), None);

        std::fs::write(ws.git_dir().join(PROMPT_TITLE_FILE), "  Use Japanese scopes\n").unwrap();
        assert_eq!(
            ws.read_prompt_file(PROMPT_TITLE_FILE).as_deref(),
            Some("Use Japanese scopes")
        );

        std::fs::write(ws.git_dir().join(PROMPT_TITLE_FILE), "   \n").unwrap();
        assert_eq!(ws.read_prompt_file(PROMPT_TITLE_FILE), None);
    }
}
