//! Access to the `git` executable
//!
//! Everything that talks to git goes through [`GitBackend`] so the tree
//! model and the task runner can be driven by an in-memory fake in tests.

use crate::error::{GitError, GitResult};
use crate::status::{Change, ChangeKind};
use std::path::Path;
use std::process::Command;

/// Operations ngm needs from git, per repository
pub trait GitBackend: Send + Sync {
    /// Raw `git status --porcelain=v2 -b` output
    fn status(&self, repo: &Path) -> GitResult<String>;

    /// Raw `git diff HEAD` output
    fn diff(&self, repo: &Path) -> GitResult<String>;

    /// Stage an untracked path
    fn stage_path(&self, repo: &Path, path: &str) -> GitResult<()>;

    /// Stage a worktree change; deletions are staged with `git rm`
    fn stage_change(&self, repo: &Path, change: &Change) -> GitResult<()>;

    /// Move a staged change back to the worktree
    fn unstage_change(&self, repo: &Path, change: &Change) -> GitResult<()>;

    /// Commit the index, returning git's summary
    fn commit(&self, repo: &Path, message: &str) -> GitResult<String>;

    /// Run an arbitrary git subcommand, returning its combined output
    fn run(&self, repo: &Path, args: &[String]) -> GitResult<String>;
}

/// [`GitBackend`] backed by the `git` binary on `PATH`
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        GitCli {
            program: "git".to_string(),
        }
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        GitCli {
            program: program.into(),
        }
    }

    fn command(&self, repo: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(repo).args(args);
        // Keep porcelain and diff output stable regardless of user config
        cmd.env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C");
        cmd
    }

    fn label(args: &[&str]) -> String {
        format!("git {}", args.first().copied().unwrap_or_default())
    }

    /// Run and capture stdout, normalising line endings
    fn capture(&self, repo: &Path, args: &[&str]) -> GitResult<Output> {
        tracing::debug!(repo = %repo.display(), ?args, "running git");
        let output = self.command(repo, args).output()?;

        let stdout = normalize_newlines(&String::from_utf8_lossy(&output.stdout));
        let stderr = normalize_newlines(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            let stderr = if stderr.trim().is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr
            };
            return Err(GitError::command(Self::label(args), stderr));
        }

        Ok(Output { stdout, stderr })
    }

    fn simple(&self, repo: &Path, args: &[&str]) -> GitResult<()> {
        self.capture(repo, args).map(|_| ())
    }
}

struct Output {
    stdout: String,
    stderr: String,
}

impl Output {
    fn combined(self) -> String {
        let mut text = self.stdout;
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        text.trim_end().to_string()
    }
}

/// Convert CRLF line endings to LF
pub fn normalize_newlines(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n")
    } else {
        text.to_string()
    }
}

impl GitBackend for GitCli {
    fn status(&self, repo: &Path) -> GitResult<String> {
        Ok(self
            .capture(repo, &["status", "--porcelain=v2", "-b"])?
            .stdout)
    }

    fn diff(&self, repo: &Path) -> GitResult<String> {
        Ok(self.capture(repo, &["diff", "HEAD"])?.stdout)
    }

    fn stage_path(&self, repo: &Path, path: &str) -> GitResult<()> {
        self.simple(repo, &["add", "--", path])
    }

    fn stage_change(&self, repo: &Path, change: &Change) -> GitResult<()> {
        match change.kind {
            ChangeKind::Deleted => self.simple(repo, &["rm", "--", &change.file]),
            _ => self.simple(repo, &["add", "--", &change.file]),
        }
    }

    fn unstage_change(&self, repo: &Path, change: &Change) -> GitResult<()> {
        self.simple(repo, &["reset", "HEAD", "--", &change.file])?;
        // Renames leave the original path deleted in the index
        if let Some(from) = &change.renamed_from {
            self.simple(repo, &["reset", "HEAD", "--", from])?;
        }
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> GitResult<String> {
        Ok(self.capture(repo, &["commit", "-m", message])?.combined())
    }

    fn run(&self, repo: &Path, args: &[String]) -> GitResult<String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Ok(self.capture(repo, &args)?.combined())
    }
}
