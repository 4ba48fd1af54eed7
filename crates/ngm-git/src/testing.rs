//! In-memory [`GitBackend`] for tests
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for downstream crates.

use crate::backend::GitBackend;
use crate::error::{GitError, GitResult};
use crate::status::Change;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct State {
    status: HashMap<PathBuf, String>,
    diff: HashMap<PathBuf, String>,
    failures: HashSet<(PathBuf, &'static str)>,
    calls: Vec<String>,
}

/// Scripted backend: canned output per repository, injectable failures and
/// a log of every mutating call
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the porcelain output returned for `repo`
    pub fn set_status(&self, repo: impl Into<PathBuf>, raw: &str) {
        self.state.lock().status.insert(repo.into(), raw.to_string());
    }

    /// Set the diff output returned for `repo`
    pub fn set_diff(&self, repo: impl Into<PathBuf>, raw: &str) {
        self.state.lock().diff.insert(repo.into(), raw.to_string());
    }

    /// Make `operation` fail for `repo`.
    ///
    /// Operation names match the trait methods: `status`, `diff`,
    /// `stage_path`, `stage_change`, `unstage_change`, `commit`, `run`.
    pub fn fail(&self, repo: impl Into<PathBuf>, operation: &'static str) {
        self.state.lock().failures.insert((repo.into(), operation));
    }

    /// Mutating calls seen so far, formatted as `op repo [arg]`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    fn check(&self, repo: &Path, operation: &'static str) -> GitResult<()> {
        let state = self.state.lock();
        if state.failures.contains(&(repo.to_path_buf(), operation)) {
            return Err(GitError::command(
                format!("git {operation}"),
                format!("fatal: scripted failure in {}", repo.display()),
            ));
        }
        Ok(())
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }
}

impl GitBackend for FakeBackend {
    fn status(&self, repo: &Path) -> GitResult<String> {
        self.check(repo, "status")?;
        Ok(self
            .state
            .lock()
            .status
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    fn diff(&self, repo: &Path) -> GitResult<String> {
        self.check(repo, "diff")?;
        Ok(self.state.lock().diff.get(repo).cloned().unwrap_or_default())
    }

    fn stage_path(&self, repo: &Path, path: &str) -> GitResult<()> {
        self.check(repo, "stage_path")?;
        self.record(format!("stage_path {} {}", repo.display(), path));
        Ok(())
    }

    fn stage_change(&self, repo: &Path, change: &Change) -> GitResult<()> {
        self.check(repo, "stage_change")?;
        self.record(format!("stage_change {} {}", repo.display(), change.file));
        Ok(())
    }

    fn unstage_change(&self, repo: &Path, change: &Change) -> GitResult<()> {
        self.check(repo, "unstage_change")?;
        self.record(format!(
            "unstage_change {} {}",
            repo.display(),
            change.file
        ));
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> GitResult<String> {
        self.check(repo, "commit")?;
        self.record(format!("commit {} {}", repo.display(), message));
        Ok(format!("[main 0000000] {message}"))
    }

    fn run(&self, repo: &Path, args: &[String]) -> GitResult<String> {
        self.check(repo, "run")?;
        let line = args.join(" ");
        self.record(format!("run {} {}", repo.display(), line));
        Ok(format!("ran {line}"))
    }
}
