//! Unified diff parsing
//!
//! Splits the output of `git diff` into one [`FileDiff`] per file. Each
//! record keeps its raw header lines and hunk lines so it can be rendered
//! or turned back into a patch unchanged.

use crate::status::ChangeKind;

/// Path git uses for the missing side of an addition or deletion
pub const DEV_NULL: &str = "/dev/null";

/// Diff of a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// Source path as printed after `--- ` (keeps the `a/` prefix)
    pub src_path: String,
    /// Destination path as printed after `+++ ` (keeps the `b/` prefix)
    pub dst_path: String,
    /// `diff --git`, `index`, mode and similarity lines
    pub header_lines: Vec<String>,
    /// Every line from the first `@@` to the end of the record
    pub hunk_lines: Vec<String>,
}

fn strip_side(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

impl FileDiff {
    pub fn is_added(&self) -> bool {
        self.src_path == DEV_NULL
    }

    pub fn is_deleted(&self) -> bool {
        self.dst_path == DEV_NULL
    }

    /// Source and destination differ once the side prefixes are removed
    pub fn is_renamed(&self) -> bool {
        !self.is_added() && !self.is_deleted() && self.src() != self.dst()
    }

    /// Source path without its `a/` prefix
    pub fn src(&self) -> &str {
        strip_side(&self.src_path)
    }

    /// Destination path without its `b/` prefix
    pub fn dst(&self) -> &str {
        strip_side(&self.dst_path)
    }

    /// Short label for the file: `path`, `path [added]`, `path [deleted]`
    /// or `old -> new`
    pub fn title(&self) -> String {
        if self.is_added() {
            format!("{} [added]", self.dst())
        } else if self.is_deleted() {
            format!("{} [deleted]", self.src())
        } else if self.is_renamed() {
            format!("{} -> {}", self.src(), self.dst())
        } else {
            self.src().to_string()
        }
    }

    /// Best guess of the change kind from the paths alone
    pub fn change_kind(&self) -> ChangeKind {
        if self.is_added() {
            ChangeKind::Added
        } else if self.is_deleted() {
            ChangeKind::Deleted
        } else if self.is_renamed() {
            ChangeKind::Renamed
        } else {
            ChangeKind::Modified
        }
    }

    /// Whether `file` is the source side (`a/<file>`)
    pub fn has_source(&self, file: &str) -> bool {
        self.src_path.strip_prefix("a/") == Some(file)
    }

    /// Whether `file` is the destination side (`b/<file>`), which is the
    /// only side naming additions and rename targets
    pub fn has_destination(&self, file: &str) -> bool {
        self.dst_path.strip_prefix("b/") == Some(file)
    }

    pub fn added_lines(&self) -> usize {
        self.hunk_lines.iter().filter(|l| l.starts_with('+')).count()
    }

    pub fn removed_lines(&self) -> usize {
        self.hunk_lines.iter().filter(|l| l.starts_with('-')).count()
    }

    /// Reassemble the record as a patch that `git apply` accepts
    pub fn patch(&self) -> String {
        let mut lines: Vec<&str> = self.header_lines.iter().map(String::as_str).collect();
        let src = format!("--- {}", self.src_path);
        let dst = format!("+++ {}", self.dst_path);
        lines.push(&src);
        lines.push(&dst);
        lines.extend(self.hunk_lines.iter().map(String::as_str));

        let mut patch = lines.join("\n");
        patch.push('\n');
        patch
    }
}

/// Parse a unified diff into per-file records.
///
/// Records without a `--- ` line (binary files, pure mode changes) are
/// dropped.
pub fn parse_diff(raw: &str) -> Vec<FileDiff> {
    let mut diffs = Vec::new();
    let mut pending = FileDiff::default();
    let mut in_hunk = false;

    let body = raw.strip_suffix('\n').unwrap_or(raw);
    if body.is_empty() {
        return diffs;
    }

    for line in body.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.starts_with("diff") {
            let done = std::mem::take(&mut pending);
            if !done.src_path.is_empty() {
                diffs.push(done);
            }
            in_hunk = false;
            pending.header_lines.push(line.to_string());
            continue;
        }

        if in_hunk {
            pending.hunk_lines.push(line.to_string());
            continue;
        }

        if let Some(path) = line.strip_prefix("--- ") {
            pending.src_path = path.to_string();
        } else if let Some(path) = line.strip_prefix("+++ ") {
            pending.dst_path = path.to_string();
        } else if line.starts_with("@@") {
            in_hunk = true;
            pending.hunk_lines.push(line.to_string());
        } else {
            pending.header_lines.push(line.to_string());
        }
    }

    if !pending.src_path.is_empty() {
        diffs.push(pending);
    }
    tracing::trace!(files = diffs.len(), "parsed diff");
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILES: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
index 3b18e51..a9c2b3f 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@
 pub mod scan;
+pub mod status;
-pub mod old;

diff --git a/new.txt b/new.txt
new file mode 100644
index 0000000..ce01362
--- /dev/null
+++ b/new.txt
@@ -0,0 +1 @@
+hello
";

    #[test]
    fn test_record_boundaries() {
        let diffs = parse_diff(TWO_FILES);
        assert_eq!(diffs.len(), 2);

        let first = &diffs[0];
        assert_eq!(first.src_path, "a/src/lib.rs");
        assert_eq!(first.dst_path, "b/src/lib.rs");
        assert_eq!(
            first.header_lines,
            vec![
                "diff --git a/src/lib.rs b/src/lib.rs",
                "index 3b18e51..a9c2b3f 100644"
            ]
        );
        assert_eq!(first.hunk_lines.len(), 5);
        assert_eq!(first.hunk_lines[0], "@@ -1,3 +1,4 @@");
        assert_eq!(first.hunk_lines[4], "");

        let second = &diffs[1];
        assert_eq!(second.header_lines[0], "diff --git a/new.txt b/new.txt");
        assert_eq!(second.hunk_lines, vec!["@@ -0,0 +1 @@", "+hello"]);
    }

    #[test]
    fn test_trailing_newline_is_not_a_hunk_line() {
        let diffs = parse_diff(TWO_FILES);
        assert_eq!(diffs[1].hunk_lines.last().map(String::as_str), Some("+hello"));
    }

    #[test]
    fn test_hunk_lines_that_look_like_headers() {
        let raw = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1,2 +1,2 @@\n--- removed dashes\n+++ added plus\n";
        let diffs = parse_diff(raw);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].src_path, "a/x");
        assert_eq!(diffs[0].dst_path, "b/x");
        assert_eq!(diffs[0].hunk_lines.len(), 3);
        assert_eq!(diffs[0].removed_lines(), 1);
        assert_eq!(diffs[0].added_lines(), 1);
    }

    #[test]
    fn test_record_without_source_is_dropped() {
        let raw = "diff --git a/img.png b/img.png\nindex 1..2 100644\nBinary files a/img.png and b/img.png differ\n";
        assert!(parse_diff(raw).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_diff("").is_empty());
        assert!(parse_diff("\n").is_empty());
    }

    #[test]
    fn test_titles() {
        let diffs = parse_diff(TWO_FILES);
        assert_eq!(diffs[0].title(), "src/lib.rs");
        assert_eq!(diffs[1].title(), "new.txt [added]");

        let deleted = FileDiff {
            src_path: "a/gone.rs".into(),
            dst_path: DEV_NULL.into(),
            ..FileDiff::default()
        };
        assert_eq!(deleted.title(), "gone.rs [deleted]");
        assert_eq!(deleted.change_kind(), ChangeKind::Deleted);

        let renamed = FileDiff {
            src_path: "a/old.rs".into(),
            dst_path: "b/new.rs".into(),
            ..FileDiff::default()
        };
        assert_eq!(renamed.title(), "old.rs -> new.rs");
        assert_eq!(renamed.change_kind(), ChangeKind::Renamed);
    }

    #[test]
    fn test_source_and_destination_paths() {
        let diffs = parse_diff(TWO_FILES);
        assert!(diffs[0].has_source("src/lib.rs"));
        assert!(!diffs[0].has_source("lib.rs"));
        assert!(!diffs[1].has_source("new.txt"));
        assert!(diffs[1].has_destination("new.txt"));
    }

    #[test]
    fn test_patch_round_trips_the_record() {
        let diffs = parse_diff(TWO_FILES);
        let patch = diffs[1].patch();
        assert_eq!(
            patch,
            "diff --git a/new.txt b/new.txt\nnew file mode 100644\nindex 0000000..ce01362\n--- /dev/null\n+++ b/new.txt\n@@ -0,0 +1 @@\n+hello\n"
        );
        assert_eq!(parse_diff(&patch), vec![diffs[1].clone()]);
    }

    #[test]
    fn test_crlf_input() {
        let raw = "diff --git a/x b/x\r\n--- a/x\r\n+++ b/x\r\n@@ -1 +1 @@\r\n-a\r\n+b\r\n";
        let diffs = parse_diff(raw);
        assert_eq!(diffs[0].src_path, "a/x");
        assert_eq!(diffs[0].hunk_lines, vec!["@@ -1 +1 @@", "-a", "+b"]);
    }
}
