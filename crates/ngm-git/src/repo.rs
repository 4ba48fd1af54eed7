//! Repository aggregate
//!
//! Pairs a repository path with its parsed status and working tree diff.

use crate::backend::GitBackend;
use crate::diff::{parse_diff, FileDiff};
use crate::error::GitResult;
use crate::status::{parse_status, Status};
use crate::tasks::{TaskObserver, TaskRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A repository with its last fetched status and diffs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    /// Absolute path to the working tree
    pub path: PathBuf,
    pub status: Status,
    pub diffs: Vec<FileDiff>,
}

impl Repository {
    /// Fetch status and diff for the repository at `path`
    pub fn fetch(backend: &dyn GitBackend, path: &Path) -> GitResult<Self> {
        let status = parse_status(&backend.status(path)?)?;
        let diffs = parse_diff(&backend.diff(path)?);
        tracing::debug!(
            repo = %path.display(),
            staged = status.staged.len(),
            unstaged = status.unstaged.len(),
            diffs = diffs.len(),
            "fetched repository"
        );
        Ok(Repository {
            path: path.to_path_buf(),
            status,
            diffs,
        })
    }

    /// Re-read the status after a staging action.
    ///
    /// The diff against `HEAD` does not change when the index does, so only
    /// the status is replaced.
    pub fn refresh_status(&mut self, backend: &dyn GitBackend) -> GitResult<()> {
        self.status = parse_status(&backend.status(&self.path)?)?;
        Ok(())
    }

    /// The diff for a status entry, if git reported one.
    ///
    /// A record whose source is `a/<file>` wins over one that only names
    /// `file` as its destination.
    pub fn diff_for(&self, file: &str) -> Option<&FileDiff> {
        self.diffs
            .iter()
            .find(|d| d.has_source(file))
            .or_else(|| self.diffs.iter().find(|d| d.has_destination(file)))
    }

    pub fn has_staged(&self) -> bool {
        !self.status.staged.is_empty()
    }
}

/// Fetch every repository in parallel.
///
/// Each path gets its own slot, in input order; one failing repository does
/// not affect the others.
pub fn fetch_all(
    runner: &TaskRunner,
    backend: Arc<dyn GitBackend>,
    paths: &[PathBuf],
    observer: Arc<dyn TaskObserver>,
) -> Vec<(PathBuf, GitResult<Repository>)> {
    let results = runner.for_each_repo(
        paths,
        move |path| Repository::fetch(backend.as_ref(), path),
        observer,
    );
    paths.iter().cloned().zip(results).collect()
}
