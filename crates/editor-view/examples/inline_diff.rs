//! Inline diff example
//!
//! Drives an `EditorSession` through an edit, a debounced diff request and a late stale
//! response, then prints the visible rows with their gutter marks.

use std::time::{Duration, Instant};

use editor_view::{
    DecorationKind, DecorationSpec, DiffLine, EditorSession, GutterMark, Motion, Range,
    SearchOptions, UnifiedLineKind, ViewConfig,
};

fn gutter(mark: Option<GutterMark>, deleted_above: Option<u32>) -> String {
    let mark = match mark {
        Some(GutterMark::Added) => "+",
        Some(GutterMark::Modified) => "~",
        None => " ",
    };
    match deleted_above {
        Some(n) => format!("{mark}▲{n}"),
        None => format!("{mark}  "),
    }
}

fn print_rows(session: &EditorSession) {
    for row in session.render_rows() {
        let number = row
            .buffer_line_index
            .map(|line| format!("{:>3}", line + 1))
            .unwrap_or_else(|| "   ".to_string());
        let body = match row.kind {
            UnifiedLineKind::Buffer => row.content.to_string(),
            UnifiedLineKind::DiffOnly => format!("- {}", row.content),
        };
        let classes: Vec<_> = row.decorations.iter().map(|d| d.class_name.as_str()).collect();
        println!(
            "  {number} {} | {body}{}",
            gutter(row.gutter_mark, row.deleted_above),
            if classes.is_empty() {
                String::new()
            } else {
                format!("    [{}]", classes.join(", "))
            }
        );
    }
}

fn main() {
    let base = "fn main() {\n    let a = 1;\n    let b = 2;\n    println!(\"{}\", a + b);\n}";
    let mut session = EditorSession::from_text(base, ViewConfig::default());
    session.set_viewport(18.0, 360.0);
    session.subscribe(|change| {
        println!(
            "  (change {:?}: v{} -> v{})",
            change.kind, change.old_version, change.new_version
        );
    });

    println!("=== Inline diff example ===\n");

    // The first request answers the pristine buffer; its response will arrive late.
    let stale = session.request_diff();

    println!("1. Edit the buffer:");
    let now = Instant::now();
    let edited = vec![
        "fn main() {".to_string(),
        "    let a = 10;".to_string(),
        "    println!(\"{}\", a);".to_string(),
        "    println!(\"done\");".to_string(),
        "}".to_string(),
    ];
    session.apply_edit(edited, 0, now);

    println!("\n2. Wait for the debounce window:");
    assert!(session.poll_diff_request(now).is_none());
    let request = session
        .poll_diff_request(now + Duration::from_millis(500))
        .expect("debounce elapsed");
    println!("  request fingerprint {:016x}", request.fingerprint.as_u64());

    let diff = vec![
        DiffLine::header("@@ -1,5 +1,5 @@"),
        DiffLine::context(1, 1, "fn main() {"),
        DiffLine::removed(2, "    let a = 1;"),
        DiffLine::removed(3, "    let b = 2;"),
        DiffLine::removed(4, "    println!(\"{}\", a + b);"),
        DiffLine::added(2, "    let a = 10;"),
        DiffLine::added(3, "    println!(\"{}\", a);"),
        DiffLine::added(4, "    println!(\"done\");"),
        DiffLine::context(5, 5, "}"),
    ];
    println!("\n3. Apply responses:");
    println!("  current: {:?}", session.accept_diff(request.fingerprint, diff));
    println!("  stale:   {:?}", session.accept_diff(stale.fingerprint, Vec::new()));

    let change_set = session.change_set();
    println!(
        "  modified {:?}, added {:?}, deleted {:?}",
        change_set.modified, change_set.added, change_set.deleted
    );

    println!("\n4. Decorate and search:");
    session.add_decoration(DecorationSpec::new(
        Range::from_offsets(0, 0, session.lines()),
        DecorationKind::Line,
        "current-line",
    ));
    let matches = session
        .highlight_matches("println", SearchOptions::default(), "search-match")
        .unwrap_or(0);
    println!("  {matches} search matches");

    println!("\n5. Gutter view:");
    print_rows(&session);

    println!("\n6. Inline view:");
    session.set_inline_diff(true);
    print_rows(&session);

    println!("\n7. Select down two lines:");
    session.move_cursor(Motion::Down, true);
    session.move_cursor(Motion::Down, true);
    println!("  selection {:?}", session.cursor().selection);
}
