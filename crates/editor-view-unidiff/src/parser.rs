//! Lenient unified-diff parser.

use editor_view::{DiffLine, DiffLineKind};

use crate::hunk::{HunkHeader, parse_hunk_header};

const TRACE_TARGET: &str = "editor_view_unidiff";

/// The diff of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// Path in the base tree; `None` for `/dev/null` (new file) or when absent.
    pub old_path: Option<String>,
    /// Path in the current tree; `None` for `/dev/null` (deleted file) or when absent.
    pub new_path: Option<String>,
    /// Header, context, added and removed lines in diff order.
    pub lines: Vec<DiffLine>,
}

impl FileDiff {
    /// Hunk headers of this file, in order.
    pub fn headers(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines
            .iter()
            .filter(|line| line.kind == DiffLineKind::Header)
    }
}

/// Counters of the hunk being read.
#[derive(Debug, Clone, Copy)]
struct HunkCursor {
    /// Next base / current line numbers; `None` when the header was malformed.
    numbers: Option<(u32, u32)>,
    /// Base / current lines still expected; `None` when unknown.
    remaining: Option<(u32, u32)>,
}

impl HunkCursor {
    fn from_header(header: &HunkHeader) -> Self {
        Self {
            numbers: Some((header.old_start, header.new_start)),
            remaining: Some((header.old_len, header.new_len)),
        }
    }

    fn unnumbered() -> Self {
        Self {
            numbers: None,
            remaining: None,
        }
    }

    /// A hunk whose header did not parse has no line counts to close it.
    fn is_unnumbered(&self) -> bool {
        self.remaining.is_none()
    }

    fn is_open(&self) -> bool {
        self.remaining
            .is_none_or(|(old, new)| old > 0 || new > 0)
    }

    fn line(&mut self, kind: DiffLineKind, content: &str) -> DiffLine {
        let (old, new) = match self.numbers {
            Some((old, new)) => (Some(old), Some(new)),
            None => (None, None),
        };
        let (takes_old, takes_new) = match kind {
            DiffLineKind::Context => (true, true),
            DiffLineKind::Removed => (true, false),
            DiffLineKind::Added => (false, true),
            DiffLineKind::Header => (false, false),
        };

        if let Some((old_no, new_no)) = self.numbers.as_mut() {
            *old_no += u32::from(takes_old);
            *new_no += u32::from(takes_new);
        }
        if let Some((old_left, new_left)) = self.remaining.as_mut() {
            *old_left = old_left.saturating_sub(u32::from(takes_old));
            *new_left = new_left.saturating_sub(u32::from(takes_new));
        }

        DiffLine {
            kind,
            content: content.to_string(),
            old_line_number: old.filter(|_| takes_old),
            new_line_number: new.filter(|_| takes_new),
        }
    }
}

/// Parse `git diff` / `diff -u` output into one [`FileDiff`] per file.
///
/// Never fails. File metadata lines (`diff --git`, `index`, mode and rename lines, `---`,
/// `+++`) fill in the paths. A hunk header that does not parse is kept as a `Header` line and
/// logged; the lines of that hunk carry no line numbers. `\ No newline at end of file` markers
/// are dropped.
pub fn parse_file_diffs(text: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<FileDiff> = None;
    let mut hunk: Option<HunkCursor> = None;

    let mut raw_lines = text.lines().peekable();

    while let Some(raw) = raw_lines.next() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(cursor) = hunk.as_mut().filter(|cursor| cursor.is_open())
            && !(cursor.is_unnumbered() && starts_file_header(line, raw_lines.peek().copied()))
        {
            let parsed = match line.chars().next() {
                Some(' ') => Some(cursor.line(DiffLineKind::Context, &line[1..])),
                Some('-') => Some(cursor.line(DiffLineKind::Removed, &line[1..])),
                Some('+') => Some(cursor.line(DiffLineKind::Added, &line[1..])),
                // Some tools strip the single space of an empty context line.
                None => Some(cursor.line(DiffLineKind::Context, "")),
                Some('\\') => continue,
                Some(_) => None,
            };
            if let Some(diff_line) = parsed {
                current.get_or_insert_with(FileDiff::default).lines.push(diff_line);
                continue;
            }
        }
        if line.starts_with('\\') {
            continue;
        }

        if line.starts_with("@@") {
            let cursor = match parse_hunk_header(line) {
                Ok(header) => HunkCursor::from_header(&header),
                Err(err) => {
                    tracing::warn!(
                        target: TRACE_TARGET,
                        header = line,
                        error = %err,
                        "malformed hunk header; hunk lines will carry no line numbers"
                    );
                    HunkCursor::unnumbered()
                }
            };
            hunk = Some(cursor);
            current
                .get_or_insert_with(FileDiff::default)
                .lines
                .push(DiffLine::header(line));
            continue;
        }

        hunk = None;
        if let Some(rest) = line.strip_prefix("diff --git ") {
            files.extend(current.take());
            let (old_path, new_path) = git_paths(rest);
            current = Some(FileDiff {
                old_path,
                new_path,
                lines: Vec::new(),
            });
        } else if let Some(path) = line.strip_prefix("--- ") {
            // Plain `diff -u` output has no `diff --git` line between files.
            if current
                .as_ref()
                .is_some_and(|file| !file.lines.is_empty())
            {
                files.extend(current.take());
            }
            current.get_or_insert_with(FileDiff::default).old_path = diff_path(path);
        } else if let Some(path) = line.strip_prefix("+++ ") {
            current.get_or_insert_with(FileDiff::default).new_path = diff_path(path);
        }
        // Anything else (`index`, mode, rename, similarity, binary notices) is metadata.
    }

    files.extend(current);
    files
}

/// Parse unified-diff output and flatten all files into one line sequence.
///
/// This is the common single-file case: `git diff -- path` handed straight to
/// [`classify`](editor_view::classify) / [`unify`](editor_view::unify).
pub fn parse_diff_lines(text: &str) -> Vec<DiffLine> {
    parse_file_diffs(text)
        .into_iter()
        .flat_map(|file| file.lines)
        .collect()
}

/// A `--- ` line directly followed by `+++ ` opens the next file of plain `diff -u` output.
fn starts_file_header(line: &str, next: Option<&str>) -> bool {
    line.starts_with("--- ") && next.is_some_and(|next| next.starts_with("+++ "))
}

fn git_paths(rest: &str) -> (Option<String>, Option<String>) {
    match rest.split_once(" b/") {
        Some((old, new)) => (
            Some(old.strip_prefix("a/").unwrap_or(old).to_string()),
            Some(new.to_string()),
        ),
        None => (None, None),
    }
}

fn diff_path(path: &str) -> Option<String> {
    // `diff -u` appends a tab and a timestamp.
    let path = path.split('\t').next().unwrap_or(path).trim_end();
    if path == "/dev/null" {
        return None;
    }
    let path = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path);
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_follow_header() {
        let lines = parse_diff_lines("@@ -5,3 +5,3 @@\n a\n-b\n+B\n c\n");
        assert_eq!(
            lines,
            vec![
                DiffLine::header("@@ -5,3 +5,3 @@"),
                DiffLine::context(5, 5, "a"),
                DiffLine::removed(6, "b"),
                DiffLine::added(6, "B"),
                DiffLine::context(7, 7, "c"),
            ]
        );
    }

    #[test]
    fn test_triple_dash_inside_hunk_is_a_removed_line() {
        let lines = parse_diff_lines("@@ -1,2 +1 @@\n--- x\n keep\n");
        assert_eq!(lines[1], DiffLine::removed(1, "-- x"));
        assert_eq!(lines[2], DiffLine::context(2, 1, "keep"));
    }

    #[test]
    fn test_malformed_header_yields_unnumbered_lines() {
        let lines = parse_diff_lines("@@ -a +b @@\n-x\n+y\n");
        assert_eq!(lines[0].kind, DiffLineKind::Header);
        assert!(
            lines[1..]
                .iter()
                .all(|l| l.old_line_number.is_none() && l.new_line_number.is_none())
        );
        assert_eq!(lines[2].kind, DiffLineKind::Added);
    }

    #[test]
    fn test_file_header_closes_unnumbered_hunk() {
        let text = "\
--- old/a.txt
+++ new/a.txt
@@ -x +y @@
-gone
--- old/b.txt
+++ new/b.txt
@@ -1 +1 @@
-b
+B
";
        let files = parse_file_diffs(text);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].lines.len(), 2);
        assert_eq!(files[0].lines[1].kind, DiffLineKind::Removed);
        assert_eq!(files[0].lines[1].content, "gone");

        assert_eq!(files[1].old_path.as_deref(), Some("old/b.txt"));
        assert_eq!(files[1].new_path.as_deref(), Some("new/b.txt"));
        assert_eq!(
            files[1].lines,
            vec![
                DiffLine::header("@@ -1 +1 @@"),
                DiffLine::removed(1, "b"),
                DiffLine::added(1, "B"),
            ]
        );
    }

    #[test]
    fn test_diff_paths() {
        assert_eq!(diff_path("a/src/lib.rs"), Some("src/lib.rs".to_string()));
        assert_eq!(
            diff_path("old.txt\t2024-01-01 00:00:00"),
            Some("old.txt".to_string())
        );
        assert_eq!(diff_path("/dev/null"), None);
    }
}
