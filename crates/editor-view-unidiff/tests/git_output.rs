use std::collections::{BTreeMap, BTreeSet};

use editor_view::{DiffLine, DiffLineKind, UnifiedLineKind, classify, unify};
use editor_view_unidiff::{FileDiff, parse_diff_lines, parse_file_diffs};
use pretty_assertions::assert_eq;

const TWO_FILES: &str = "\
diff --git a/src/main.rs b/src/main.rs
index 83db48f..bf269f4 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,4 +1,5 @@
 fn main() {
-    println!(\"hi\");
+    let name = \"world\";
+    println!(\"hi {name}\");
 }

diff --git a/notes.txt b/notes.txt
deleted file mode 100644
index 3b18e51..0000000
--- a/notes.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-first
-second
\\ No newline at end of file
";

#[test]
fn test_git_diff_with_two_files() {
    let files = parse_file_diffs(TWO_FILES);
    assert_eq!(files.len(), 2);

    let main = &files[0];
    assert_eq!(main.old_path.as_deref(), Some("src/main.rs"));
    assert_eq!(main.new_path.as_deref(), Some("src/main.rs"));
    assert_eq!(main.headers().count(), 1);
    assert_eq!(
        main.lines[1..],
        [
            DiffLine::context(1, 1, "fn main() {"),
            DiffLine::removed(2, "    println!(\"hi\");"),
            DiffLine::added(2, "    let name = \"world\";"),
            DiffLine::added(3, "    println!(\"hi {name}\");"),
            DiffLine::context(3, 4, "}"),
            DiffLine::context(4, 5, ""),
        ]
    );

    let notes = &files[1];
    assert_eq!(notes.old_path.as_deref(), Some("notes.txt"));
    assert_eq!(notes.new_path, None);
    assert_eq!(
        notes.lines[1..],
        [DiffLine::removed(1, "first"), DiffLine::removed(2, "second")]
    );
}

#[test]
fn test_parsed_diff_feeds_the_view_core() {
    let files = parse_file_diffs(TWO_FILES);
    let buffer = [
        "fn main() {",
        "    let name = \"world\";",
        "    println!(\"hi {name}\");",
        "}",
        "",
    ];

    let set = classify(&files[0].lines);
    assert_eq!(set.modified, BTreeSet::from([1]));
    assert_eq!(set.added, BTreeSet::from([2]));
    assert!(set.deleted.is_empty());

    let rows = unify(&buffer, &files[0].lines);
    let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            UnifiedLineKind::Buffer,
            UnifiedLineKind::DiffOnly,
            UnifiedLineKind::Buffer,
            UnifiedLineKind::Buffer,
            UnifiedLineKind::Buffer,
            UnifiedLineKind::Buffer,
        ]
    );

    let deleted_file = classify(&files[1].lines);
    assert_eq!(deleted_file.deleted, BTreeMap::from([(0, 2)]));
}

#[test]
fn test_plain_diff_u_output() {
    let text = "\
--- old/a.txt\t2024-05-01 10:00:00.000000000 +0200
+++ new/a.txt\t2024-05-01 10:05:00.000000000 +0200
@@ -2 +2 @@
-b
+B
--- old/b.txt\t2024-05-01 10:00:00.000000000 +0200
+++ new/b.txt\t2024-05-01 10:05:00.000000000 +0200
@@ -0,0 +1 @@
+new
";
    let files = parse_file_diffs(text);
    assert_eq!(
        files,
        vec![
            FileDiff {
                old_path: Some("old/a.txt".to_string()),
                new_path: Some("new/a.txt".to_string()),
                lines: vec![
                    DiffLine::header("@@ -2 +2 @@"),
                    DiffLine::removed(2, "b"),
                    DiffLine::added(2, "B"),
                ],
            },
            FileDiff {
                old_path: Some("old/b.txt".to_string()),
                new_path: Some("new/b.txt".to_string()),
                lines: vec![DiffLine::header("@@ -0,0 +1 @@"), DiffLine::added(1, "new")],
            },
        ]
    );
}

#[test]
fn test_zero_context_hunks_flatten_in_order() {
    let text = "\
@@ -1 +0,0 @@
-x
@@ -4 +2,0 @@
-c
";
    let lines = parse_diff_lines(text);
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.kind == DiffLineKind::Header)
            .count(),
        2
    );
    assert_eq!(
        classify(&lines).deleted,
        BTreeMap::from([(0, 1), (2, 1)])
    );
}

#[test]
fn test_empty_input() {
    assert!(parse_file_diffs("").is_empty());
    assert!(parse_diff_lines("index 123..456\n").is_empty());
}
