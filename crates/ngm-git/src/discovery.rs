//! Finding the repositories nested under a root directory
//!
//! A full walk can be slow on large trees, so the result is cached in
//! `<root>/.ngm/directories` and only refreshed on request.

use crate::error::GitResult;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory holding ngm's per-root state
pub const STATE_DIR: &str = ".ngm";

/// Cache file name inside [`STATE_DIR`]
pub const CACHE_FILE: &str = "directories";

/// Walk settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Directory names never descended into
    pub exclude: Vec<String>,
    /// Maximum depth below the root, unlimited when `None`
    pub max_depth: Option<usize>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DiscoveryOptions {
            exclude: vec!["node_modules".to_string(), "target".to_string()],
            max_depth: None,
        }
    }
}

/// Turn a path from the index back into an absolute working tree path
pub fn absolute(root: &Path, relative: &Path) -> PathBuf {
    if relative == Path::new(".") {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

/// Path shown to the user: relative to `root`, `.` for the root itself
pub fn relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

/// Find every git working tree under `root`, sorted, relative to `root`.
///
/// The root itself is reported as `.` when it is a repository.
pub fn find_repositories(root: &Path, options: &DiscoveryOptions) -> GitResult<Vec<PathBuf>> {
    // Surface a missing root as an error instead of an empty walk
    fs::metadata(root)?;

    let exclude = options.exclude.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .max_depth(options.max_depth)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name();
            name != ".git" && !exclude.iter().any(|x| name == x.as_str())
        })
        .build();

    let mut found = BTreeSet::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }

        let dir = entry.path();
        if !dir.join(".git").exists() {
            continue;
        }
        if let Err(e) = git2::Repository::open(dir) {
            tracing::warn!(path = %dir.display(), error = %e, "ignoring invalid repository");
            continue;
        }

        let relative = match dir.strip_prefix(root) {
            Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
            Ok(rel) => rel.to_path_buf(),
            Err(_) => dir.to_path_buf(),
        };
        found.insert(relative);
    }

    tracing::info!(root = %root.display(), count = found.len(), "indexed repositories");
    Ok(found.into_iter().collect())
}

/// Repositories that appeared or disappeared between two indexes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDiff {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl IndexDiff {
    pub fn between(before: &[PathBuf], after: &[PathBuf]) -> Self {
        let before: BTreeSet<_> = before.iter().collect();
        let after: BTreeSet<_> = after.iter().collect();
        IndexDiff {
            added: after.difference(&before).map(|p| p.to_path_buf()).collect(),
            removed: before.difference(&after).map(|p| p.to_path_buf()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The on-disk repository index for one root
#[derive(Debug, Clone)]
pub struct DiscoveryCache {
    root: PathBuf,
}

impl DiscoveryCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiscoveryCache { root: root.into() }
    }

    pub fn file(&self) -> PathBuf {
        self.root.join(STATE_DIR).join(CACHE_FILE)
    }

    /// Read the cached list; `None` when no index has been written yet
    pub fn load(&self) -> GitResult<Option<Vec<PathBuf>>> {
        let content = match fs::read_to_string(self.file()) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let paths = content
            .replace("\r\n", "\n")
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();
        Ok(Some(paths))
    }

    pub fn store(&self, paths: &[PathBuf]) -> GitResult<()> {
        let file = self.file();
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut content = String::new();
        for path in paths {
            content.push_str(&path.to_string_lossy());
            content.push('\n');
        }
        fs::write(&file, content)?;
        tracing::debug!(file = %file.display(), count = paths.len(), "wrote repository index");
        Ok(())
    }

    /// Cached list, indexing first when there is none or `reindex` is set
    pub fn load_or_index(
        &self,
        options: &DiscoveryOptions,
        reindex: bool,
    ) -> GitResult<Vec<PathBuf>> {
        if !reindex {
            if let Some(paths) = self.load()? {
                return Ok(paths);
            }
        }
        let paths = find_repositories(&self.root, options)?;
        self.store(&paths)?;
        Ok(paths)
    }

    /// Re-walk the root, store the result and report what changed
    pub fn reindex(&self, options: &DiscoveryOptions) -> GitResult<IndexDiff> {
        let before = self.load()?.unwrap_or_default();
        let after = find_repositories(&self.root, options)?;
        self.store(&after)?;
        Ok(IndexDiff::between(&before, &after))
    }
}
