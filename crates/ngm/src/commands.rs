//! Non-interactive subcommands
//!
//! Every command runs its git work through the [`TaskRunner`], one job per
//! repository, and writes a report per repository. Commands return `false`
//! when any repository failed so `main` can set the exit code.

use crate::progress::Spinners;
use anyhow::{bail, Result};
use crossterm::style::{Color, Stylize};
use ngm_git::discovery::{absolute, relative};
use ngm_git::{
    ChangeKind, DiscoveryCache, DiscoveryOptions, GitBackend, GitResult, Repository, TaskRunner,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The repositories under one root and the means to run git in them
pub struct Workspace {
    root: PathBuf,
    repos: Vec<PathBuf>,
    backend: Arc<dyn GitBackend>,
    runner: TaskRunner,
    color: bool,
    progress: bool,
}

impl Workspace {
    /// `repos` are relative to `root`, as stored in the discovery index
    pub fn new(
        root: impl Into<PathBuf>,
        repos: &[PathBuf],
        backend: Arc<dyn GitBackend>,
        runner: TaskRunner,
    ) -> Self {
        let root = root.into();
        let repos = repos.iter().map(|r| absolute(&root, r)).collect();
        Workspace {
            root,
            repos,
            backend,
            runner,
            color: false,
            progress: false,
        }
    }

    /// Colour the output with ANSI escapes
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Show spinners on stderr while jobs run
    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute repository paths
    pub fn repos(&self) -> &[PathBuf] {
        &self.repos
    }

    pub fn backend(&self) -> Arc<dyn GitBackend> {
        Arc::clone(&self.backend)
    }

    /// Hand the runner over, e.g. to the interactive UI
    pub fn into_runner(self) -> TaskRunner {
        self.runner
    }

    fn label(&self, path: &Path) -> String {
        relative(&self.root, path)
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn for_each<T, F>(&self, targets: &[PathBuf], job: F) -> Vec<(PathBuf, GitResult<T>)>
    where
        T: Send + 'static,
        F: Fn(&Path) -> GitResult<T> + Send + Sync + 'static,
    {
        let labels = targets.iter().map(|p| self.label(p)).collect();
        let spinners = Arc::new(Spinners::new(labels, self.progress));
        let results = self.runner.for_each_repo(targets, job, spinners.clone());
        spinners.clear();
        targets.iter().cloned().zip(results).collect()
    }

    fn fetch(&self) -> Vec<(PathBuf, GitResult<Repository>)> {
        let backend = self.backend();
        self.for_each(&self.repos, move |path| Repository::fetch(backend.as_ref(), path))
    }

    /// `[OK] path` / `[ERROR] path` followed by the indented output
    fn report(&self, out: &mut dyn Write, path: &Path, result: &GitResult<String>) -> Result<()> {
        let label = self.label(path);
        let body = match result {
            Ok(output) => {
                writeln!(out, "{} {}", self.paint("[OK]", Color::Green), label)?;
                output.clone()
            }
            Err(e) => {
                writeln!(out, "{} {}", self.paint("[ERROR]", Color::Red), label)?;
                e.to_string()
            }
        };
        for line in body.lines() {
            writeln!(out, "    {line}")?;
        }
        Ok(())
    }

    fn failure(&self, out: &mut dyn Write, path: &Path, error: &dyn std::fmt::Display) -> Result<()> {
        writeln!(out, "{} {}", self.paint("✗", Color::Red), self.label(path))?;
        writeln!(out, "    {error}")?;
        Ok(())
    }
}

/// One summary per repository: branch, tracking counters and every change
pub fn status(ws: &Workspace, out: &mut dyn Write) -> Result<bool> {
    let mut ok = true;
    for (path, result) in ws.fetch() {
        let repo = match result {
            Ok(repo) => repo,
            Err(e) => {
                ok = false;
                ws.failure(out, &path, &e)?;
                continue;
            }
        };

        let status = &repo.status;
        writeln!(
            out,
            "{} {}  {}",
            ws.paint("✔", Color::Green),
            ws.label(&path),
            ws.paint(&status.branch.summary(), Color::DarkGrey)
        )?;
        for change in &status.staged {
            writeln!(out, "    {}", ws.paint(&format!("+ {change}"), Color::Green))?;
        }
        for change in &status.unstaged {
            writeln!(out, "    {}", ws.paint(&format!("~ {change}"), Color::Yellow))?;
        }
        for entry in &status.unmerged {
            writeln!(out, "    {}", ws.paint(&format!("! {entry}"), Color::Red))?;
        }
        for file in &status.untracked {
            writeln!(out, "    {}", ws.paint(&format!("? {file}"), Color::Blue))?;
        }
    }
    Ok(ok)
}

fn boxed(title: &str) -> [String; 3] {
    let rule = "─".repeat(title.chars().count() + 2);
    [
        format!("┌{rule}┐"),
        format!("│ {title} │"),
        format!("└{rule}┘"),
    ]
}

fn kind_color(kind: ChangeKind) -> Color {
    match kind {
        ChangeKind::Added => Color::Green,
        ChangeKind::Deleted => Color::Red,
        ChangeKind::Renamed => Color::Yellow,
        _ => Color::Reset,
    }
}

/// Every file diff of every repository.
///
/// Files get a boxed title with their line counts and coloured hunks; with
/// `patch` each record is printed as plain text that `git apply` accepts.
pub fn diff(ws: &Workspace, out: &mut dyn Write, patch: bool) -> Result<bool> {
    let mut ok = true;
    for (path, result) in ws.fetch() {
        let repo = match result {
            Ok(repo) => repo,
            Err(e) => {
                ok = false;
                ws.failure(out, &path, &e)?;
                continue;
            }
        };
        if repo.diffs.is_empty() {
            continue;
        }

        if patch {
            writeln!(out, "# {}", ws.label(&path))?;
            for file in &repo.diffs {
                write!(out, "{}", file.patch())?;
            }
            continue;
        }

        writeln!(out, "{}", ws.paint(&ws.label(&path), Color::Magenta))?;
        for file in &repo.diffs {
            let title = format!(
                "{}  +{} -{}",
                file.title(),
                file.added_lines(),
                file.removed_lines()
            );
            let color = kind_color(file.change_kind());
            for line in boxed(&title) {
                writeln!(out, "{}", ws.paint(&line, color))?;
            }
            for line in &file.hunk_lines {
                let color = match line.as_bytes().first() {
                    Some(b'@') => Color::Cyan,
                    Some(b'+') => Color::Green,
                    Some(b'-') => Color::Red,
                    _ => Color::Reset,
                };
                writeln!(out, "{}", ws.paint(line, color))?;
            }
        }
        writeln!(out)?;
    }
    Ok(ok)
}

/// Run `git <args>` in every repository, e.g. `pull --rebase`
pub fn run_everywhere(ws: &Workspace, out: &mut dyn Write, args: Vec<String>) -> Result<bool> {
    let backend = ws.backend();
    let results = ws.for_each(ws.repos(), move |path| backend.run(path, &args));

    let mut ok = true;
    for (path, result) in &results {
        ok &= result.is_ok();
        ws.report(out, path, result)?;
    }
    Ok(ok)
}

/// Commit `message` in every repository that has staged changes
pub fn commit(ws: &Workspace, out: &mut dyn Write, message: &str) -> Result<bool> {
    let message = message.trim().to_string();
    if message.is_empty() {
        bail!("empty commit message");
    }

    let mut ok = true;
    let mut targets = Vec::new();
    for (path, result) in ws.fetch() {
        match result {
            Ok(repo) if repo.has_staged() => targets.push(path),
            Ok(_) => {}
            Err(e) => {
                ok = false;
                ws.failure(out, &path, &e)?;
            }
        }
    }
    if targets.is_empty() {
        writeln!(out, "Nothing staged")?;
        return Ok(ok);
    }

    let backend = ws.backend();
    let results = ws.for_each(&targets, move |path| backend.commit(path, &message));
    for (path, result) in &results {
        ok &= result.is_ok();
        ws.report(out, path, result)?;
    }
    Ok(ok)
}

/// Walk the root again and print which repositories appeared or vanished
pub fn index(cache: &DiscoveryCache, options: &DiscoveryOptions, out: &mut dyn Write) -> Result<bool> {
    let changes = cache.reindex(options)?;
    if changes.is_empty() {
        writeln!(out, "No changes")?;
        return Ok(true);
    }

    if !changes.added.is_empty() {
        writeln!(out, "Added:")?;
        for path in &changes.added {
            writeln!(out, "    {}", path.display())?;
        }
    }
    if !changes.removed.is_empty() {
        writeln!(out, "Removed:")?;
        for path in &changes.removed {
            writeln!(out, "    {}", path.display())?;
        }
    }
    Ok(true)
}
