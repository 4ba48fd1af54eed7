//! Error types for the ngm-git crate

use std::path::PathBuf;
use thiserror::Error;

/// Git-specific errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Not inside a Git repository
    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// A porcelain status line carried a change code outside `MADRCTU`
    #[error("unsupported change kind '{0}' in status output")]
    UnknownChangeKind(String),

    /// A git invocation exited unsuccessfully
    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },

    /// libgit2 rejected a repository during discovery
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Directory walk failed
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// IO operation failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A parallel job panicked or was cancelled before reporting
    #[error("task '{name}' did not complete: {reason}")]
    Task { name: String, reason: String },
}

impl GitError {
    /// Build a [`GitError::Command`] from a command label and its stderr
    pub fn command(command: impl Into<String>, stderr: impl AsRef<str>) -> Self {
        GitError::Command {
            command: command.into(),
            stderr: stderr.as_ref().trim().to_string(),
        }
    }
}

/// Result type alias for Git operations
pub type GitResult<T> = Result<T, GitError>;
