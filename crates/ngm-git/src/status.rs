//! `git status --porcelain=v2 -b` parsing
//!
//! The report is parsed line by line; the first whitespace-delimited token
//! selects the line type:
//!
//! ```text
//! # branch.<key> <value>
//! 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
//! 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path><TAB><origPath>
//! u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
//! ? <path>
//! ```
//!
//! Anything else is skipped so newer porcelain sections do not break
//! parsing.

use crate::error::{GitError, GitResult};
use crate::scan::{ch, digit, eol, lit, whitespace, ScanCursor};
use std::fmt;

/// Kind of change recorded for one side (index or worktree) of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Unmerged,
}

impl ChangeKind {
    /// Parse a single porcelain status letter.
    ///
    /// `.` is not a change kind; callers filter it out before calling this.
    pub fn from_code(code: &str) -> GitResult<Self> {
        match code {
            "M" => Ok(ChangeKind::Modified),
            "A" => Ok(ChangeKind::Added),
            "D" => Ok(ChangeKind::Deleted),
            "R" => Ok(ChangeKind::Renamed),
            "C" => Ok(ChangeKind::Copied),
            "T" => Ok(ChangeKind::TypeChanged),
            "U" => Ok(ChangeKind::Unmerged),
            other => Err(GitError::UnknownChangeKind(other.to_string())),
        }
    }

    /// Get a single character indicator for the kind
    pub fn indicator(&self) -> char {
        match self {
            ChangeKind::Modified => 'M',
            ChangeKind::Added => 'A',
            ChangeKind::Deleted => 'D',
            ChangeKind::Renamed => 'R',
            ChangeKind::Copied => 'C',
            ChangeKind::TypeChanged => 'T',
            ChangeKind::Unmerged => 'U',
        }
    }

    /// Nerd-font glyph for the kind
    pub fn icon(&self) -> &'static str {
        match self {
            ChangeKind::Modified => "\u{f11e8}",
            ChangeKind::Added => "\u{ea7f}",
            ChangeKind::Deleted => "\u{f1037}",
            ChangeKind::Renamed => "\u{f1031}",
            ChangeKind::Copied => "\u{f018f}",
            ChangeKind::TypeChanged => "\u{f107c}",
            ChangeKind::Unmerged => "\u{ea6c}",
        }
    }
}

/// One staged or unstaged entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    /// Path relative to the repository root
    pub file: String,
    /// Original path for renames and copies
    pub renamed_from: Option<String>,
}

impl Change {
    pub fn new(kind: ChangeKind, file: impl Into<String>) -> Self {
        Change {
            kind,
            file: file.into(),
            renamed_from: None,
        }
    }

    /// Render as `<marker> <file>` with an optional ` → <origin>` suffix
    pub fn label(&self, marker: &str) -> String {
        match &self.renamed_from {
            Some(from) => format!("{} {} → {}", marker, self.file, from),
            None => format!("{} {}", marker, self.file),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(&self.kind.indicator().to_string()))
    }
}

/// A conflicted entry, with the state of both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmergedChange {
    pub index_kind: ChangeKind,
    pub worktree_kind: ChangeKind,
    pub file: String,
}

impl UnmergedChange {
    /// Human description of the conflict, e.g. "both modified".
    ///
    /// Pairs without a conventional name fall back to the two indicators.
    pub fn description(&self) -> String {
        use ChangeKind::{Added, Deleted, Unmerged};

        let known = match (self.index_kind, self.worktree_kind) {
            (Unmerged, Unmerged) => Some("both modified"),
            (Unmerged, Added) => Some("added by them"),
            (Unmerged, Deleted) => Some("deleted by them"),
            (Added, Unmerged) => Some("added by us"),
            (Added, Added) => Some("both added"),
            (Deleted, Unmerged) => Some("deleted by us"),
            (Deleted, Deleted) => Some("both deleted"),
            _ => None,
        };
        match known {
            Some(text) => text.to_string(),
            None => format!(
                "{}{}",
                self.index_kind.indicator(),
                self.worktree_kind.indicator()
            ),
        }
    }
}

impl fmt::Display for UnmergedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.description(), self.file)
    }
}

/// Tracking information for the upstream branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upstream {
    pub reference: String,
    pub ahead: u32,
    pub behind: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub commit_id: String,
    pub upstream: Option<Upstream>,
}

impl Branch {
    /// `name ↑ahead ↓behind`, counters only when an upstream is tracked
    pub fn summary(&self) -> String {
        match &self.upstream {
            Some(up) => format!("{} ↑{} ↓{}", self.name, up.ahead, up.behind),
            None => self.name.clone(),
        }
    }
}

/// Parsed status of one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub branch: Branch,
    pub staged: Vec<Change>,
    pub unstaged: Vec<Change>,
    pub unmerged: Vec<UnmergedChange>,
    pub untracked: Vec<String>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.unstaged.is_empty()
            && self.unmerged.is_empty()
            && self.untracked.is_empty()
    }

    /// Compact counters, e.g. `+2 ~1 ?3`; empty for a clean tree
    pub fn glance(&self) -> String {
        let mut parts = Vec::new();
        if !self.staged.is_empty() {
            parts.push(format!("+{}", self.staged.len()));
        }
        if !self.unstaged.is_empty() {
            parts.push(format!("~{}", self.unstaged.len()));
        }
        if !self.unmerged.is_empty() {
            parts.push(format!("!{}", self.unmerged.len()));
        }
        if !self.untracked.is_empty() {
            parts.push(format!("?{}", self.untracked.len()));
        }
        parts.join(" ")
    }
}

/// Parse a full `git status --porcelain=v2 -b` report
pub fn parse_status(raw: &str) -> GitResult<Status> {
    let mut status = Status::default();
    let mut cursor = ScanCursor::new(raw);

    cursor.trim_start();
    while !cursor.is_empty() {
        let line_type = cursor.take_until(whitespace());
        match line_type.as_str() {
            "#" => parse_header(&mut status, cursor.take_line()),
            "1" => parse_ordinary(&mut status, cursor.take_line())?,
            "2" => parse_rename_or_copy(&mut status, cursor.take_line())?,
            "u" => parse_unmerged(&mut status, cursor.take_line())?,
            "?" => {
                cursor.seek_past(whitespace());
                let path = cursor.take_line();
                status.untracked.push(path.as_str().to_string());
            }
            other => {
                tracing::trace!(
                    kind = other,
                    line = cursor.peek_until(eol()).as_str(),
                    "skipping status line"
                );
                cursor.take_line();
            }
        }
        cursor.trim_start();
    }

    Ok(status)
}

fn upstream_mut(status: &mut Status) -> &mut Upstream {
    status.branch.upstream.get_or_insert_with(Upstream::default)
}

fn parse_header(status: &mut Status, mut line: ScanCursor<'_>) {
    line.trim_start();
    let mut key = line.split_on_next(whitespace());
    key.seek_past(lit("branch."));
    if key.is_empty() {
        return;
    }

    match key.as_str() {
        "oid" => status.branch.commit_id = line.take_until(whitespace()).as_str().to_string(),
        "head" => status.branch.name = line.take_until(whitespace()).as_str().to_string(),
        "upstream" => {
            upstream_mut(status).reference = line.take_until(whitespace()).as_str().to_string();
        }
        "ab" => {
            let mut ahead = line.split_on_next(whitespace());
            let ahead = read_number(&mut ahead);
            let behind = read_number(&mut line);
            let upstream = upstream_mut(status);
            upstream.ahead = ahead;
            upstream.behind = behind;
        }
        other => tracing::trace!(key = other, "ignoring branch header"),
    }
}

/// Read the first digit run; signs and other decoration are skipped.
fn read_number(cursor: &mut ScanCursor<'_>) -> u32 {
    cursor.seek(digit());
    cursor.take_while(digit()).as_str().parse().unwrap_or(0)
}

/// Next whitespace-delimited field
fn field<'a>(line: &mut ScanCursor<'a>) -> ScanCursor<'a> {
    line.trim_start();
    line.take_until(whitespace())
}

fn skip_fields(line: &mut ScanCursor<'_>, count: usize) {
    for _ in 0..count {
        field(line);
    }
}

/// Everything after the single separator that follows the last field
fn rest_after_separator<'a>(line: &mut ScanCursor<'a>) -> ScanCursor<'a> {
    line.seek_past(whitespace());
    *line
}

/// Read the `<XY> <sub>` prefix shared by changed-entry lines.
///
/// Returns `None` for submodule entries, which are not tracked.
fn entry_codes<'a>(line: &mut ScanCursor<'a>) -> Option<(&'a str, &'a str)> {
    line.seek_past(whitespace());
    let index = line.take(1).as_str();
    let worktree = line.take(1).as_str();

    let submodule = field(line);
    if !submodule.starts_with(ch('N')) {
        tracing::debug!(marker = submodule.as_str(), "skipping submodule entry");
        return None;
    }
    Some((index, worktree))
}

fn push_changes(
    status: &mut Status,
    index: &str,
    worktree: &str,
    file: &str,
    renamed_from: Option<&str>,
) -> GitResult<()> {
    let make = |code: &str| -> GitResult<Change> {
        Ok(Change {
            kind: ChangeKind::from_code(code)?,
            file: file.to_string(),
            renamed_from: renamed_from.map(str::to_string),
        })
    };

    if index != "." {
        status.staged.push(make(index)?);
    }
    if worktree != "." {
        status.unstaged.push(make(worktree)?);
    }
    Ok(())
}

fn parse_ordinary(status: &mut Status, mut line: ScanCursor<'_>) -> GitResult<()> {
    let Some((index, worktree)) = entry_codes(&mut line) else {
        return Ok(());
    };
    // <mH> <mI> <mW> <hH> <hI>
    skip_fields(&mut line, 5);
    let path = rest_after_separator(&mut line);

    push_changes(status, index, worktree, path.as_str(), None)
}

fn parse_rename_or_copy(status: &mut Status, mut line: ScanCursor<'_>) -> GitResult<()> {
    let Some((index, worktree)) = entry_codes(&mut line) else {
        return Ok(());
    };
    // <mH> <mI> <mW> <hH> <hI> <X><score>
    skip_fields(&mut line, 6);
    let mut paths = rest_after_separator(&mut line);
    let path = paths.take_until(ch('\t'));
    paths.seek_past(ch('\t'));

    push_changes(
        status,
        index,
        worktree,
        path.as_str(),
        Some(paths.as_str()),
    )
}

fn parse_unmerged(status: &mut Status, mut line: ScanCursor<'_>) -> GitResult<()> {
    let Some((index, worktree)) = entry_codes(&mut line) else {
        return Ok(());
    };
    // <m1> <m2> <m3> <mW> <h1> <h2> <h3>
    skip_fields(&mut line, 7);
    let path = rest_after_separator(&mut line);

    status.unmerged.push(UnmergedChange {
        index_kind: ChangeKind::from_code(index)?,
        worktree_kind: ChangeKind::from_code(worktree)?,
        file: path.as_str().to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "ede67606cd3cd505a02e33a7c681f792c950f14e";

    fn ordinary(xy: &str, path: &str) -> String {
        format!("1 {xy} N... 100644 100644 100644 {HASH} {HASH} {path}")
    }

    #[test]
    fn test_full_report() {
        let raw = format!(
            "\n# branch.oid 1476deeddba487aa5e58c9d696c8f3b49df6ca1e\n\
             # branch.head feat/go-rewrite\n\
             # branch.upstream origin/feat/go-rewrite\n\
             # branch.ab +0 -0\n\
             {}\n\
             ? lib/slice/find.go\n\
             ? lib/string-view/\n",
            ordinary(".M", "git/status.go")
        );

        let status = parse_status(&raw).expect("parse");
        assert_eq!(
            status.branch.commit_id,
            "1476deeddba487aa5e58c9d696c8f3b49df6ca1e"
        );
        assert_eq!(status.branch.name, "feat/go-rewrite");
        assert_eq!(
            status.branch.upstream,
            Some(Upstream {
                reference: "origin/feat/go-rewrite".into(),
                ahead: 0,
                behind: 0,
            })
        );
        assert!(status.staged.is_empty());
        assert_eq!(
            status.unstaged,
            vec![Change::new(ChangeKind::Modified, "git/status.go")]
        );
        assert_eq!(status.untracked, vec!["lib/slice/find.go", "lib/string-view/"]);
    }

    #[test]
    fn test_ordinary_line_dispatch() {
        let status = parse_status(&ordinary(".M", "path/to/file")).expect("parse");
        assert!(status.staged.is_empty());
        assert_eq!(
            status.unstaged,
            vec![Change::new(ChangeKind::Modified, "path/to/file")]
        );
    }

    #[test]
    fn test_ordinary_line_both_columns() {
        let status = parse_status(&ordinary("AM", "src/new.rs")).expect("parse");
        assert_eq!(status.staged, vec![Change::new(ChangeKind::Added, "src/new.rs")]);
        assert_eq!(
            status.unstaged,
            vec![Change::new(ChangeKind::Modified, "src/new.rs")]
        );
    }

    #[test]
    fn test_path_with_spaces_and_leading_digit() {
        let status = parse_status(&ordinary("M.", "2024 notes/read me.md")).expect("parse");
        assert_eq!(status.staged[0].file, "2024 notes/read me.md");
    }

    #[test]
    fn test_rename_line() {
        let raw = format!("2 R. N... 100644 100644 100644 {HASH} {HASH} R100 newname\toldname\n");
        let status = parse_status(&raw).expect("parse");
        assert_eq!(
            status.staged,
            vec![Change {
                kind: ChangeKind::Renamed,
                file: "newname".into(),
                renamed_from: Some("oldname".into()),
            }]
        );
        assert!(status.unstaged.is_empty());
    }

    #[test]
    fn test_rename_line_both_columns() {
        let raw = format!("2 RM N... 100644 100644 100644 {HASH} {HASH} R100 b.txt\ta.txt");
        let status = parse_status(&raw).expect("parse");
        assert_eq!(status.staged[0].renamed_from.as_deref(), Some("a.txt"));
        assert_eq!(status.unstaged[0].file, "b.txt");
        assert_eq!(status.unstaged[0].renamed_from.as_deref(), Some("a.txt"));
        assert_eq!(status.unstaged[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn test_ahead_behind() {
        let raw = "# branch.upstream origin/main\n# branch.ab +2 -5\n";
        let status = parse_status(raw).expect("parse");
        assert_eq!(
            status.branch.upstream,
            Some(Upstream {
                reference: "origin/main".into(),
                ahead: 2,
                behind: 5,
            })
        );
    }

    #[test]
    fn test_ahead_behind_without_upstream_line() {
        let status = parse_status("# branch.ab +1 -0").expect("parse");
        let upstream = status.branch.upstream.expect("upstream");
        assert_eq!(upstream.reference, "");
        assert_eq!((upstream.ahead, upstream.behind), (1, 0));
    }

    #[test]
    fn test_no_upstream() {
        let status = parse_status("# branch.oid (initial)\n# branch.head main\n").expect("parse");
        assert_eq!(status.branch.commit_id, "(initial)");
        assert!(status.branch.upstream.is_none());
    }

    #[test]
    fn test_unmerged_line() {
        let raw = format!("u UU N... 100644 100644 100644 100644 {HASH} {HASH} {HASH} conflict.txt");
        let status = parse_status(&raw).expect("parse");
        assert_eq!(
            status.unmerged,
            vec![UnmergedChange {
                index_kind: ChangeKind::Unmerged,
                worktree_kind: ChangeKind::Unmerged,
                file: "conflict.txt".into(),
            }]
        );
        assert_eq!(status.unmerged[0].to_string(), "both modified conflict.txt");
    }

    #[test]
    fn test_unmerged_descriptions() {
        let make = |i, w| UnmergedChange {
            index_kind: i,
            worktree_kind: w,
            file: "f".into(),
        };
        use ChangeKind::*;
        assert_eq!(make(Added, Unmerged).description(), "added by us");
        assert_eq!(make(Unmerged, Added).description(), "added by them");
        assert_eq!(make(Deleted, Deleted).description(), "both deleted");
        assert_eq!(make(Modified, Added).description(), "MA");
    }

    #[test]
    fn test_submodule_entries_are_ignored() {
        let raw = format!("1 .M SC.. 160000 160000 160000 {HASH} {HASH} vendor/lib");
        let status = parse_status(&raw).expect("parse");
        assert!(status.is_clean());
    }

    #[test]
    fn test_unknown_line_types_are_skipped() {
        let raw = format!("# stash 2\n! target/\n{}\n", ordinary("M.", "a"));
        let status = parse_status(&raw).expect("parse");
        assert_eq!(status.staged.len(), 1);
    }

    #[test]
    fn test_unknown_change_kind_aborts() {
        let err = parse_status(&ordinary(".X", "a")).unwrap_err();
        assert!(matches!(err, GitError::UnknownChangeKind(code) if code == "X"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_status("").expect("parse"), Status::default());
        assert_eq!(parse_status("\n\n  \n").expect("parse"), Status::default());
    }

    #[test]
    fn test_glance_and_summary() {
        let raw = format!(
            "# branch.head main\n# branch.upstream origin/main\n# branch.ab +3 -1\n{}\n? x\n",
            ordinary("MM", "a")
        );
        let status = parse_status(&raw).expect("parse");
        assert_eq!(status.glance(), "+1 ~1 ?1");
        assert_eq!(status.branch.summary(), "main ↑3 ↓1");
    }

    #[test]
    fn test_change_display() {
        let change = Change {
            kind: ChangeKind::Renamed,
            file: "new".into(),
            renamed_from: Some("old".into()),
        };
        assert_eq!(change.to_string(), "R new → old");
    }
}
