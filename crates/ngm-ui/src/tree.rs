//! Expandable tree of repositories, changes and diffs
//!
//! Nodes live in a flat arena and point at their parent by index. The rows
//! on screen are the pre-order walk of every open node, kept in `lines`;
//! expanding a node splices its freshly built children in after it and
//! collapsing drops the contiguous run of its descendants, returning their
//! slots to a free list for the next expansion.

use ngm_git::{Change, GitBackend, GitResult, Repository, UnmergedChange};
use std::path::{Path, PathBuf};

/// Rows kept between the cursor and the viewport edges
pub const SCROLL_MARGIN: usize = 5;

/// Placeholder for a repository without changes
pub const NO_CHANGES: &str = "No changes";

/// Placeholder for a change without a matching diff
pub const NO_DIFF: &str = "No diff";

/// Arena index of a node
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root row, `repo` indexes [`Tree::repos`]
    Repository { repo: usize, open: bool },
    /// `"<Title> (<n>)"`
    SectionHeader { title: String },
    UntrackedFile { repo: usize, path: String },
    UnstagedChange { repo: usize, change: Change, open: bool },
    StagedChange { repo: usize, change: Change, open: bool },
    UnmergedFile { repo: usize, entry: UnmergedChange },
    DiffHunkLine { text: String },
    /// Separator or placeholder text
    Blank { text: String },
    /// Inline error reported by a staging action
    Message { text: String },
}

impl NodeKind {
    fn open_flag(&self) -> Option<bool> {
        match self {
            NodeKind::Repository { open, .. }
            | NodeKind::UnstagedChange { open, .. }
            | NodeKind::StagedChange { open, .. } => Some(*open),
            _ => None,
        }
    }

    fn set_open(&mut self, value: bool) {
        match self {
            NodeKind::Repository { open, .. }
            | NodeKind::UnstagedChange { open, .. }
            | NodeKind::StagedChange { open, .. } => *open = value,
            _ => {}
        }
    }

    fn blank(text: &str) -> Self {
        NodeKind::Blank {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// A repository slot: either fetched or the reason it could not be
#[derive(Debug)]
pub struct RepoEntry {
    pub path: PathBuf,
    pub state: GitResult<Repository>,
}

impl RepoEntry {
    pub fn repository(&self) -> Option<&Repository> {
        self.state.as_ref().ok()
    }
}

#[derive(Debug)]
pub struct Tree {
    root: PathBuf,
    repos: Vec<RepoEntry>,
    nodes: Vec<Node>,
    /// Arena slots released by collapsed subtrees
    free: Vec<NodeId>,
    lines: Vec<NodeId>,
    cursor: usize,
    scroll: usize,
    height: usize,
}

impl Tree {
    /// Build a tree with one closed root row per fetched repository
    pub fn new(root: impl Into<PathBuf>, fetched: Vec<(PathBuf, GitResult<Repository>)>) -> Self {
        let mut tree = Tree {
            root: root.into(),
            repos: Vec::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            lines: Vec::new(),
            cursor: 0,
            scroll: 0,
            height: 1,
        };
        tree.rebuild(fetched);
        tree
    }

    /// Replace every repository, dropping all expansion state.
    ///
    /// The cursor row is kept, clamped to the new length.
    pub fn rebuild(&mut self, fetched: Vec<(PathBuf, GitResult<Repository>)>) {
        self.nodes.clear();
        self.free.clear();
        self.lines.clear();
        self.repos = fetched
            .into_iter()
            .map(|(path, state)| RepoEntry { path, state })
            .collect();

        for repo in 0..self.repos.len() {
            let id = self.push(NodeKind::Repository { repo, open: false }, None);
            self.lines.push(id);
        }
        self.cursor = self.cursor.min(self.lines.len().saturating_sub(1));
        self.follow_cursor();
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let node = Node { kind, parent };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repos(&self) -> &[RepoEntry] {
        &self.repos
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Displayed rows, top to bottom
    pub fn lines(&self) -> &[NodeId] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cursor_node(&self) -> Option<&Node> {
        self.lines.get(self.cursor).map(|id| &self.nodes[*id])
    }

    /// Rows inside the viewport with their absolute row number
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Node)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(self.height)
            .map(|(row, id)| (row, &self.nodes[*id]))
    }

    /// Repositories that have something staged
    pub fn staged_repos(&self) -> Vec<PathBuf> {
        self.repos
            .iter()
            .filter(|e| e.repository().is_some_and(Repository::has_staged))
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn repo_paths(&self) -> Vec<PathBuf> {
        self.repos.iter().map(|e| e.path.clone()).collect()
    }

    // === Cursor and viewport ===

    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        self.follow_cursor();
    }

    /// Move by `delta` rows, clamped to the tree
    pub fn move_cursor(&mut self, delta: isize) {
        if self.lines.is_empty() {
            return;
        }
        let last = (self.lines.len() - 1) as isize;
        self.cursor = (self.cursor as isize).saturating_add(delta).clamp(0, last) as usize;
        self.follow_cursor();
    }

    pub fn page(&mut self, pages: isize) {
        self.move_cursor(pages.saturating_mul(self.height as isize));
    }

    pub fn top(&mut self) {
        self.move_cursor(isize::MIN);
    }

    pub fn bottom(&mut self) {
        self.move_cursor(isize::MAX);
    }

    fn margin(&self) -> usize {
        SCROLL_MARGIN.min(self.height.saturating_sub(1) / 2)
    }

    fn follow_cursor(&mut self) {
        let margin = self.margin();
        if self.cursor < self.scroll + margin {
            self.scroll = self.cursor.saturating_sub(margin);
        } else if self.cursor + margin >= self.scroll + self.height {
            self.scroll = self.cursor + margin + 1 - self.height;
        }
    }

    // === Expansion ===

    /// `Some(open)` for nodes that can be expanded
    fn expandable(&self, id: NodeId) -> Option<bool> {
        let node = &self.nodes[id];
        if let NodeKind::Repository { repo, .. } = node.kind {
            self.repos[repo].repository()?;
        }
        node.kind.open_flag()
    }

    /// Expand or collapse the node under the cursor.
    ///
    /// On a leaf the cursor moves to the parent, which is then toggled.
    pub fn toggle(&mut self) {
        let Some(&id) = self.lines.get(self.cursor) else {
            return;
        };
        match self.expandable(id) {
            Some(true) => self.collapse_at(self.cursor),
            Some(false) => self.expand_at(self.cursor),
            None => {
                let Some(parent) = self.nodes[id].parent else {
                    return;
                };
                if let Some(pos) = self.position(parent) {
                    self.cursor = pos;
                    self.follow_cursor();
                    self.toggle();
                }
            }
        }
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        self.lines.iter().position(|n| *n == id)
    }

    fn repo_position(&self, repo: usize) -> Option<usize> {
        self.lines.iter().position(|id| {
            matches!(self.nodes[*id].kind, NodeKind::Repository { repo: r, .. } if r == repo)
        })
    }

    fn is_descendant(&self, mut id: NodeId, ancestor: NodeId) -> bool {
        while let Some(parent) = self.nodes[id].parent {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    fn collapse_at(&mut self, pos: usize) {
        let id = self.lines[pos];
        let run = self.lines[pos + 1..]
            .iter()
            .take_while(|n| self.is_descendant(**n, id))
            .count();
        let released: Vec<NodeId> = self.lines.drain(pos + 1..pos + 1 + run).collect();
        self.free.extend(released);
        self.nodes[id].kind.set_open(false);

        if self.cursor > pos + run {
            self.cursor -= run;
        } else if self.cursor > pos {
            self.cursor = pos;
        }
        self.follow_cursor();
    }

    fn expand_at(&mut self, pos: usize) {
        let id = self.lines[pos];
        let kinds = self.child_kinds(id);
        let children: Vec<NodeId> = kinds
            .into_iter()
            .map(|kind| self.push(kind, Some(id)))
            .collect();

        if self.cursor > pos {
            self.cursor += children.len();
        }
        let tail = self.lines.split_off(pos + 1);
        self.lines.extend(children);
        self.lines.extend(tail);
        self.nodes[id].kind.set_open(true);
        self.follow_cursor();
    }

    fn child_kinds(&self, id: NodeId) -> Vec<NodeKind> {
        match &self.nodes[id].kind {
            NodeKind::Repository { repo, .. } => self.repos[*repo]
                .repository()
                .map(|r| repository_children(*repo, r))
                .unwrap_or_default(),
            NodeKind::UnstagedChange { repo, change, .. }
            | NodeKind::StagedChange { repo, change, .. } => {
                let hunks = self.repos[*repo]
                    .repository()
                    .and_then(|r| r.diff_for(&change.file))
                    .map(|d| d.hunk_lines.as_slice())
                    .unwrap_or_default();
                if hunks.is_empty() {
                    vec![NodeKind::blank(NO_DIFF)]
                } else {
                    hunks
                        .iter()
                        .map(|text| NodeKind::DiffHunkLine { text: text.clone() })
                        .collect()
                }
            }
            _ => Vec::new(),
        }
    }

    // === Staging ===

    /// Stage the untracked file or unstaged change under the cursor.
    ///
    /// Returns `Ok(false)` when the cursor is on anything else. Failures are
    /// also shown as a message row under the repository.
    pub fn stage(&mut self, backend: &dyn GitBackend) -> GitResult<bool> {
        let Some(node) = self.cursor_node() else {
            return Ok(false);
        };
        let (repo, result) = match &node.kind {
            NodeKind::UntrackedFile { repo, path } => {
                (*repo, backend.stage_path(&self.repos[*repo].path, path))
            }
            NodeKind::UnstagedChange { repo, change, .. } => {
                (*repo, backend.stage_change(&self.repos[*repo].path, change))
            }
            _ => return Ok(false),
        };
        self.finish_action(repo, result, backend)?;
        Ok(true)
    }

    /// Unstage the staged change under the cursor
    pub fn unstage(&mut self, backend: &dyn GitBackend) -> GitResult<bool> {
        let Some(node) = self.cursor_node() else {
            return Ok(false);
        };
        let (repo, result) = match &node.kind {
            NodeKind::StagedChange { repo, change, .. } => {
                (*repo, backend.unstage_change(&self.repos[*repo].path, change))
            }
            _ => return Ok(false),
        };
        self.finish_action(repo, result, backend)?;
        Ok(true)
    }

    fn finish_action(
        &mut self,
        repo: usize,
        result: GitResult<()>,
        backend: &dyn GitBackend,
    ) -> GitResult<()> {
        let outcome = match result {
            Ok(()) => self.refresh_repo(repo, backend),
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            tracing::warn!(repo = %self.repos[repo].path.display(), error = %e, "staging failed");
            self.show_message(repo, e.to_string());
        }
        outcome
    }

    /// Re-read one repository's status and rebuild its open subtree
    pub fn refresh_repo(&mut self, repo: usize, backend: &dyn GitBackend) -> GitResult<()> {
        if let Ok(repository) = &mut self.repos[repo].state {
            repository.refresh_status(backend)?;
        }

        let row = self.cursor;
        if let Some(pos) = self.repo_position(repo) {
            if self.nodes[self.lines[pos]].kind.open_flag() == Some(true) {
                self.collapse_at(pos);
                self.expand_at(pos);
            }
        }
        self.cursor = row.min(self.lines.len().saturating_sub(1));
        self.follow_cursor();
        Ok(())
    }

    /// Insert a message row directly under an open repository
    fn show_message(&mut self, repo: usize, text: String) {
        let Some(pos) = self.repo_position(repo) else {
            return;
        };
        let parent = self.lines[pos];
        if self.nodes[parent].kind.open_flag() != Some(true) {
            return;
        }
        let id = self.push(NodeKind::Message { text }, Some(parent));
        self.lines.insert(pos + 1, id);
        if self.cursor > pos {
            self.cursor += 1;
        }
        self.follow_cursor();
    }
}

fn repository_children(repo: usize, repository: &Repository) -> Vec<NodeKind> {
    let status = &repository.status;
    let mut kinds = Vec::new();

    let untracked = status
        .untracked
        .iter()
        .map(|path| NodeKind::UntrackedFile {
            repo,
            path: path.clone(),
        })
        .collect();
    push_section(&mut kinds, "Untracked", untracked);

    let unstaged = status
        .unstaged
        .iter()
        .map(|change| NodeKind::UnstagedChange {
            repo,
            change: change.clone(),
            open: false,
        })
        .collect();
    push_section(&mut kinds, "Unstaged", unstaged);

    let unmerged = status
        .unmerged
        .iter()
        .map(|entry| NodeKind::UnmergedFile {
            repo,
            entry: entry.clone(),
        })
        .collect();
    push_section(&mut kinds, "Unmerged", unmerged);

    let staged = status
        .staged
        .iter()
        .map(|change| NodeKind::StagedChange {
            repo,
            change: change.clone(),
            open: false,
        })
        .collect();
    push_section(&mut kinds, "Staged", staged);

    if kinds.is_empty() {
        kinds.push(NodeKind::blank(NO_CHANGES));
        kinds.push(NodeKind::blank(""));
    }
    kinds
}

fn push_section(kinds: &mut Vec<NodeKind>, title: &str, entries: Vec<NodeKind>) {
    if entries.is_empty() {
        return;
    }
    kinds.push(NodeKind::SectionHeader {
        title: format!("{} ({})", title, entries.len()),
    });
    kinds.extend(entries);
    kinds.push(NodeKind::blank(""));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngm_git::testing::FakeBackend;
    use ngm_git::{ChangeKind, GitError};

    const A: &str = "/work/a";
    const B: &str = "/work/b";
    const HASH: &str = "ede67606cd3cd505a02e33a7c681f792c950f14e";

    fn entry(xy: &str, path: &str) -> String {
        format!("1 {xy} N... 100644 100644 100644 {HASH} {HASH} {path}\n")
    }

    fn status_a() -> String {
        format!(
            "# branch.head main\n? notes.md\n{}{}",
            entry(".M", "src/lib.rs"),
            entry("A.", "new.rs")
        )
    }

    const DIFF_A: &str = "diff --git a/src/lib.rs b/src/lib.rs\n--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1 +1 @@\n-old\n+new\n";

    fn backend() -> FakeBackend {
        let fake = FakeBackend::new();
        fake.set_status(A, &status_a());
        fake.set_diff(A, DIFF_A);
        fake.set_status(B, "# branch.head main\n");
        fake
    }

    fn tree(fake: &FakeBackend) -> Tree {
        let fetched = [A, B]
            .iter()
            .map(|p| (PathBuf::from(p), Repository::fetch(fake, Path::new(p))))
            .collect();
        let mut tree = Tree::new("/work", fetched);
        tree.set_height(40);
        tree
    }

    fn kinds(tree: &Tree) -> Vec<NodeKind> {
        tree.lines().iter().map(|id| tree.node(*id).kind.clone()).collect()
    }

    fn header(title: &str) -> NodeKind {
        NodeKind::SectionHeader {
            title: title.into(),
        }
    }

    #[test]
    fn test_roots_start_closed() {
        let fake = backend();
        let tree = tree(&fake);
        assert_eq!(tree.len(), 2);
        assert_eq!(
            kinds(&tree),
            vec![
                NodeKind::Repository { repo: 0, open: false },
                NodeKind::Repository { repo: 1, open: false },
            ]
        );
    }

    #[test]
    fn test_repository_expands_into_sections() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();

        let rows = kinds(&tree);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0], NodeKind::Repository { repo: 0, open: true });
        assert_eq!(rows[1], header("Untracked (1)"));
        assert_eq!(
            rows[2],
            NodeKind::UntrackedFile {
                repo: 0,
                path: "notes.md".into()
            }
        );
        assert_eq!(rows[3], NodeKind::blank(""));
        assert_eq!(rows[4], header("Unstaged (1)"));
        assert_eq!(rows[7], header("Staged (1)"));
        assert_eq!(rows[9], NodeKind::blank(""));
        assert_eq!(rows[10], NodeKind::Repository { repo: 1, open: false });

        for id in &tree.lines()[1..10] {
            assert_eq!(tree.node(*id).parent, Some(tree.lines()[0]));
        }
    }

    #[test]
    fn test_clean_repository_shows_placeholder() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.move_cursor(1);
        tree.toggle();
        assert_eq!(
            kinds(&tree)[2..],
            [NodeKind::blank(NO_CHANGES), NodeKind::blank("")]
        );
    }

    #[test]
    fn test_collapse_restores_previous_rows() {
        let fake = backend();
        let mut tree = tree(&fake);
        let before = kinds(&tree);

        tree.toggle();
        tree.move_cursor(5);
        tree.toggle();
        tree.move_cursor(-5);
        tree.toggle();
        assert_eq!(kinds(&tree), before);

        tree.toggle();
        tree.toggle();
        assert_eq!(kinds(&tree), before);
    }

    #[test]
    fn test_change_expands_to_correlated_diff() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(5);
        tree.toggle();

        let rows = kinds(&tree);
        assert!(matches!(
            &rows[5],
            NodeKind::UnstagedChange { change, open: true, .. } if change.file == "src/lib.rs"
        ));
        let hunk: Vec<_> = rows[6..9].to_vec();
        assert_eq!(
            hunk,
            ["@@ -1 +1 @@", "-old", "+new"]
                .iter()
                .map(|t| NodeKind::DiffHunkLine { text: t.to_string() })
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_change_without_diff_shows_placeholder() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(8);
        tree.toggle();
        assert_eq!(kinds(&tree)[9], NodeKind::blank(NO_DIFF));
    }

    #[test]
    fn test_toggle_on_leaf_collapses_parent() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(5);
        tree.toggle();
        tree.move_cursor(2);
        assert!(matches!(
            tree.cursor_node().map(|n| &n.kind),
            Some(NodeKind::DiffHunkLine { .. })
        ));

        tree.toggle();
        assert_eq!(tree.cursor(), 5);
        assert_eq!(tree.len(), 11);

        tree.move_cursor(-3);
        tree.toggle();
        assert_eq!(tree.cursor(), 0);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_failed_repository_is_not_expandable() {
        let fake = backend();
        fake.fail(B, "status");
        let mut tree = tree(&fake);
        tree.move_cursor(1);
        tree.toggle();
        assert_eq!(tree.len(), 2);
        assert!(tree.repos()[1].state.is_err());
    }

    #[test]
    fn test_cursor_is_clamped() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.move_cursor(-3);
        assert_eq!(tree.cursor(), 0);
        tree.move_cursor(10);
        assert_eq!(tree.cursor(), 1);
        tree.top();
        assert_eq!(tree.cursor(), 0);
        tree.bottom();
        assert_eq!(tree.cursor(), 1);
    }

    #[test]
    fn test_scroll_keeps_margin() {
        let fetched = (0..40)
            .map(|i| {
                let path = PathBuf::from(format!("/work/r{i}"));
                (path.clone(), Ok(Repository { path, ..Repository::default() }))
            })
            .collect();
        let mut tree = Tree::new("/work", fetched);
        tree.set_height(20);

        tree.move_cursor(14);
        assert_eq!(tree.scroll(), 0);
        tree.move_cursor(1);
        assert_eq!((tree.cursor(), tree.scroll()), (15, 1));
        tree.move_cursor(10);
        assert_eq!((tree.cursor(), tree.scroll()), (25, 11));

        tree.move_cursor(-5);
        assert_eq!(tree.scroll(), 11);
        tree.move_cursor(-5);
        assert_eq!((tree.cursor(), tree.scroll()), (15, 10));

        tree.page(1);
        assert_eq!(tree.cursor(), 35);
        tree.top();
        assert_eq!(tree.scroll(), 0);
        assert_eq!(tree.visible().count(), 20);
    }

    #[test]
    fn test_stage_untracked_file() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(2);

        fake.set_status(
            A,
            &format!(
                "# branch.head main\n{}{}",
                entry(".M", "src/lib.rs"),
                entry("A.", "new.rs") + &entry("A.", "notes.md")
            ),
        );
        assert!(tree.stage(&fake).expect("stage"));
        assert_eq!(fake.calls(), vec!["stage_path /work/a notes.md"]);

        let rows = kinds(&tree);
        assert_eq!(rows[1], header("Unstaged (1)"));
        assert_eq!(rows[4], header("Staged (2)"));
        assert_eq!(tree.cursor(), 2);
        assert_eq!(tree.repos()[0].repository().map(|r| r.status.staged.len()), Some(2));
    }

    #[test]
    fn test_stage_and_unstage_changes() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(5);
        assert!(tree.stage(&fake).expect("stage"));

        tree.move_cursor(3);
        assert!(tree.unstage(&fake).expect("unstage"));
        assert_eq!(
            fake.calls(),
            vec![
                "stage_change /work/a src/lib.rs",
                "unstage_change /work/a new.rs"
            ]
        );
    }

    #[test]
    fn test_stage_on_wrong_row_is_a_noop() {
        let fake = backend();
        let mut tree = tree(&fake);
        assert!(!tree.stage(&fake).expect("stage"));
        tree.toggle();
        tree.move_cursor(8);
        assert!(!tree.stage(&fake).expect("stage"));
        tree.move_cursor(-3);
        assert!(!tree.unstage(&fake).expect("unstage"));
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_stage_failure_is_reported_inline() {
        let fake = backend();
        fake.fail(A, "stage_change");
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(5);

        let err = tree.stage(&fake).unwrap_err();
        assert!(matches!(err, GitError::Command { .. }));
        assert!(matches!(
            &kinds(&tree)[1],
            NodeKind::Message { text } if text.contains("scripted failure")
        ));
        assert!(matches!(
            &tree.cursor_node().map(|n| &n.kind),
            Some(NodeKind::UnstagedChange { change, .. }) if change.kind == ChangeKind::Modified
        ));

        // The session carries on
        tree.move_cursor(-6);
        tree.toggle();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_staged_repos() {
        let fake = backend();
        let tree = tree(&fake);
        assert_eq!(tree.staged_repos(), vec![PathBuf::from(A)]);
        assert_eq!(tree.repo_paths().len(), 2);
    }

    #[test]
    fn test_toggling_reuses_arena_slots() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(5);
        tree.toggle();
        let arena = tree.nodes.len();
        let rows = tree.len();

        for _ in 0..100 {
            tree.toggle();
            tree.toggle();
        }
        assert_eq!(tree.len(), rows);
        assert_eq!(tree.nodes.len(), arena);
        assert!(tree.free.is_empty());
    }

    #[test]
    fn test_repeated_staging_reuses_arena_slots() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(5);
        assert!(tree.stage(&fake).expect("stage"));
        let arena = tree.nodes.len();

        for _ in 0..20 {
            assert!(tree.stage(&fake).expect("stage"));
        }
        assert_eq!(tree.nodes.len(), arena);
        assert_eq!(tree.len(), 11);
    }

    #[test]
    fn test_rebuild_resets_expansion() {
        let fake = backend();
        let mut tree = tree(&fake);
        tree.toggle();
        tree.move_cursor(9);
        let fetched = vec![(PathBuf::from(A), Repository::fetch(&fake, Path::new(A)))];
        tree.rebuild(fetched);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.cursor(), 0);
    }
}
