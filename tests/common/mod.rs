//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{Oid, Repository, Signature};

use aicommits::commit::{GenerationRequest, PromptConstraints, StagedDiff, Turn};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    ///
    /// The repository carries its own identity so `git commit` works in CI.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
            config
                .set_bool("commit.gpgsign", false)
                .expect("Failed to disable signing");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Add `relative` to the index.
    pub fn stage(&self, relative: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new(relative))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage a file in one step.
    pub fn write_staged(&self, relative: &str, content: &str) {
        self.write(relative, content);
        self.stage(relative);
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit at HEAD.
    pub fn head_message(&self) -> String {
        let head = self
            .repo
            .head()
            .expect("No HEAD")
            .peel_to_commit()
            .expect("HEAD is not a commit");
        head.message().unwrap_or_default().to_string()
    }
}

/// A request for a one-file diff with default constraints.
pub fn sample_request(history: Vec<Turn>) -> GenerationRequest {
    let diff = StagedDiff::new(["src/app.ts"], "diff --git a/src/app.ts b/src/app.ts\n+retry();\n")
        .expect("non-empty file list");
    GenerationRequest::new(Arc::new(diff), PromptConstraints::default(), history)
}
