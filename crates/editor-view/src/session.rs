//! Editor session: the per-document composition root.
//!
//! # Overview
//!
//! [`EditorSession`] owns everything the view core keeps for one open document:
//!
//! - **Buffer**: the current line array
//! - **Cursor**: a [`CursorMachine`]
//! - **Decorations**: a [`DecorationIndex`]
//! - **Viewport**: scroll metrics and a [`Viewport`] virtualizer
//! - **Diff**: the latest accepted diff, its [`ChangeSet`] and unified rows, plus the
//!   [`DiffSync`] that debounces requests and drops stale responses
//!
//! The host drives it explicitly: it feeds edits, motions, scroll events and diff responses in,
//! and pulls [`RenderRow`]s for the visible slice out. Every mutation that actually changes
//! state increments the session version and notifies subscribers.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use editor_view::{DiffLine, DiffOutcome, EditorSession, GutterMark, ViewConfig};
//!
//! let mut session = EditorSession::from_text("a\nb\nc", ViewConfig::default());
//! session.set_viewport(20.0, 400.0);
//!
//! let now = Instant::now();
//! session.apply_edit(vec!["a".into(), "B".into(), "c".into()], 3, now);
//!
//! let request = session
//!     .poll_diff_request(now + Duration::from_millis(500))
//!     .expect("debounce elapsed");
//!
//! // ...the host computes the diff asynchronously...
//! let diff = vec![DiffLine::removed(2, "b"), DiffLine::added(2, "B")];
//! assert_eq!(session.accept_diff(request.fingerprint, diff), DiffOutcome::Applied);
//!
//! let rows = session.render_rows();
//! assert_eq!(rows[1].gutter_mark, Some(GutterMark::Modified));
//! ```

use std::mem;
use std::time::Instant;

use crate::change_set::{ChangeSet, GutterMark, classify};
use crate::config::ViewConfig;
use crate::cursor::{CursorMachine, CursorState, Motion, SelectionMode};
use crate::decorations::{Decoration, DecorationId, DecorationIndex, DecorationKind, DecorationSpec};
use crate::diff::DiffLine;
use crate::diff_sync::{DiffRequest, DiffSync, Fingerprint};
use crate::error::SearchError;
use crate::position::{Position, clamp_signed_offset, clamp_u32, offset_to_position};
use crate::search::{SearchOptions, find_all};
use crate::text::split_lines;
use crate::unified::{UnifiedLine, UnifiedLineKind, plain_lines, row_for_buffer_line, unify};
use crate::viewport::{Viewport, VisibleRange};

const TRACE_TARGET: &str = "editor_view::session";

/// What kind of state a [`SessionChange`] touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Buffer content replaced.
    Document,
    /// Caret moved without affecting the selection.
    Cursor,
    /// Selection created, resized or cleared.
    Selection,
    /// Scroll offset, viewport size or row layout changed.
    Viewport,
    /// A diff response was applied or inline-diff display was toggled.
    Diff,
    /// Decorations added or removed through the session.
    Decorations,
}

/// State change record passed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionChange {
    /// What changed.
    pub kind: ChangeKind,
    /// Version before the change.
    pub old_version: u64,
    /// Version after the change.
    pub new_version: u64,
}

/// Subscriber callback type.
pub type SessionChangeCallback = Box<dyn FnMut(&SessionChange) + Send>;

/// Result of handing a diff response to [`EditorSession::accept_diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOutcome {
    /// The response matched the latest request and is now displayed.
    Applied,
    /// The response was for older content and was dropped.
    Stale,
}

/// Host scroll metrics, in host pixels (or any consistent unit).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    /// Current vertical scroll offset.
    pub scroll_top: f64,
    /// Height of one row.
    pub line_height: f64,
    /// Height of the visible area.
    pub viewport_height: f64,
}

/// One materialized row of the visible range.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRow<'a> {
    /// Row index in the current layout (buffer lines, or unified rows in inline-diff mode).
    pub row: u32,
    /// Whether the row is a buffer line or a deleted diff-only line.
    pub kind: UnifiedLineKind,
    /// Buffer line shown by this row; `None` for diff-only rows.
    pub buffer_line_index: Option<u32>,
    /// Text to render.
    pub content: &'a str,
    /// Gutter marker for buffer rows.
    pub gutter_mark: Option<GutterMark>,
    /// Number of base lines deleted right before this buffer row.
    pub deleted_above: Option<u32>,
    /// Decorations reported on this buffer row, in insertion order.
    pub decorations: Vec<&'a Decoration>,
    /// Diff line this row was matched with, in inline-diff mode.
    pub diff_line: Option<&'a DiffLine>,
}

/// View state for one open document.
///
/// Not thread-safe by itself; all mutation goes through `&mut self`. The session is `Send`, so a
/// host can move it to a worker thread or wrap it in a single-writer lock.
pub struct EditorSession {
    lines: Vec<String>,
    cursor: CursorMachine,
    decorations: DecorationIndex,
    search_highlights: Vec<DecorationId>,
    viewport: Viewport,
    metrics: ViewportMetrics,
    diff_sync: DiffSync,
    diff_lines: Vec<DiffLine>,
    change_set: ChangeSet,
    inline_diff: bool,
    rows: Vec<UnifiedLine>,
    state_version: u64,
    callbacks: Vec<SessionChangeCallback>,
}

impl EditorSession {
    /// Create a session over `lines`.
    pub fn new(lines: Vec<String>, config: ViewConfig) -> Self {
        let rows = plain_lines(&lines);
        Self {
            lines,
            cursor: CursorMachine::new(),
            decorations: DecorationIndex::new(),
            search_highlights: Vec::new(),
            viewport: Viewport::new(config.viewport),
            metrics: ViewportMetrics::default(),
            diff_sync: DiffSync::new(config.diff.debounce()),
            diff_lines: Vec::new(),
            change_set: ChangeSet::default(),
            inline_diff: config.diff.inline,
            rows,
            state_version: 0,
            callbacks: Vec::new(),
        }
    }

    /// Create a session from document text (see [`split_lines`]).
    pub fn from_text(text: &str, config: ViewConfig) -> Self {
        Self::new(split_lines(text), config)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Current buffer lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of buffer lines.
    pub fn line_count(&self) -> u32 {
        clamp_u32(self.lines.len())
    }

    /// Caret, selection and desired column.
    pub fn cursor(&self) -> &CursorState {
        self.cursor.state()
    }

    /// Whether a selection is active.
    pub fn selection_mode(&self) -> SelectionMode {
        self.cursor.mode()
    }

    /// Resolve an offset against the current buffer.
    pub fn position_at(&self, offset: u32) -> Position {
        offset_to_position(offset, &self.lines)
    }

    /// Clamp a signed offset (e.g. `caret + delta`) into the current buffer.
    pub fn clamp_offset(&self, offset: i64) -> u32 {
        clamp_signed_offset(offset, &self.lines)
    }

    /// Stored decorations.
    pub fn decorations(&self) -> &DecorationIndex {
        &self.decorations
    }

    /// Mutable access to the decoration store.
    ///
    /// Changes made through this reference are not tracked; call
    /// [`mark_modified`](Self::mark_modified) with [`ChangeKind::Decorations`] afterwards.
    pub fn decorations_mut(&mut self) -> &mut DecorationIndex {
        &mut self.decorations
    }

    /// Gutter classification of the latest accepted diff.
    pub fn change_set(&self) -> &ChangeSet {
        &self.change_set
    }

    /// Latest accepted diff lines.
    pub fn diff_lines(&self) -> &[DiffLine] {
        &self.diff_lines
    }

    /// Rows of the current layout: unified rows in inline-diff mode, one row per buffer line
    /// otherwise.
    pub fn unified_lines(&self) -> &[UnifiedLine] {
        &self.rows
    }

    /// Number of rows in the current layout.
    pub fn row_count(&self) -> u32 {
        clamp_u32(self.rows.len())
    }

    /// Whether deleted lines are interleaved into the layout.
    pub fn inline_diff(&self) -> bool {
        self.inline_diff
    }

    /// Lines deleted after the last buffer line, if any.
    pub fn deleted_at_end(&self) -> Option<u32> {
        self.change_set.deleted_before(self.line_count())
    }

    /// Current scroll metrics.
    pub fn metrics(&self) -> ViewportMetrics {
        self.metrics
    }

    /// Rows to materialize for the current scroll metrics.
    pub fn visible_range(&self) -> VisibleRange {
        self.viewport.visible_range(
            self.metrics.scroll_top,
            self.metrics.line_height,
            self.metrics.viewport_height,
            self.row_count(),
        )
    }

    /// Total scrollable height of the current layout.
    pub fn scroll_height(&self) -> f64 {
        self.viewport
            .scroll_height(self.row_count(), self.metrics.line_height)
    }

    /// Materialize the rows of the current visible range.
    pub fn render_rows(&self) -> Vec<RenderRow<'_>> {
        let range = self.visible_range();
        self.rows
            .get(range.as_usize_range())
            .unwrap_or_default()
            .iter()
            .zip(range.start..)
            .map(|(row, index)| self.render_row(index, row))
            .collect()
    }

    fn render_row<'a>(&'a self, index: u32, row: &'a UnifiedLine) -> RenderRow<'a> {
        let (gutter_mark, deleted_above, decorations) = match row.buffer_line_index {
            Some(line) => (
                self.change_set.mark_for_line(line),
                self.change_set.deleted_before(line),
                self.decorations.for_line(line),
            ),
            None => (None, None, Vec::new()),
        };
        RenderRow {
            row: index,
            kind: row.kind,
            buffer_line_index: row.buffer_line_index,
            content: &row.content,
            gutter_mark,
            deleted_above,
            decorations,
            diff_line: row.diff_line.as_ref(),
        }
    }

    // ---------------------------------------------------------------------
    // Buffer and cursor
    // ---------------------------------------------------------------------

    /// Replace the buffer after an edit made at `now`.
    ///
    /// The caret moves to `cursor_offset` (clamped), the selection and desired column are
    /// dropped, the retained diff is re-unified against the new lines and a diff request is
    /// scheduled once the debounce window elapses.
    pub fn apply_edit(&mut self, new_lines: Vec<String>, cursor_offset: u32, now: Instant) {
        let document_changed = new_lines != self.lines;
        let cursor_before = *self.cursor.state();

        self.lines = new_lines;
        self.cursor.apply_edit(&self.lines, cursor_offset);

        if document_changed {
            self.diff_sync.note_edit(now);
            self.rebuild_rows();
            tracing::debug!(
                target: TRACE_TARGET,
                lines = self.lines.len(),
                cursor = self.cursor.position().offset,
                "buffer edited; diff request scheduled"
            );
            self.mark_modified(ChangeKind::Document);
        } else if *self.cursor.state() != cursor_before {
            self.mark_modified(ChangeKind::Cursor);
        }
        self.reveal_cursor();
    }

    /// Apply a caret motion; `extend` grows the selection. Scrolls to keep the caret visible.
    ///
    /// Returns `true` if the cursor state changed.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) -> bool {
        let selection_before = self.cursor.selection();
        if !self.cursor.move_cursor(motion, extend, &self.lines) {
            return false;
        }
        let kind = if self.cursor.selection() != selection_before {
            ChangeKind::Selection
        } else {
            ChangeKind::Cursor
        };
        self.mark_modified(kind);
        self.reveal_cursor();
        true
    }

    /// Select from `anchor_offset` to `active_offset` (equal offsets place the caret).
    pub fn set_selection(&mut self, anchor_offset: u32, active_offset: u32) {
        let before = *self.cursor.state();
        self.cursor
            .set_selection(anchor_offset, active_offset, &self.lines);
        let after = *self.cursor.state();
        if after == before {
            return;
        }
        let kind = if after.selection != before.selection {
            ChangeKind::Selection
        } else {
            ChangeKind::Cursor
        };
        self.mark_modified(kind);
        self.reveal_cursor();
    }

    /// Place the caret at `offset`, dropping any selection.
    pub fn set_cursor(&mut self, offset: u32) {
        self.set_selection(offset, offset);
    }

    // ---------------------------------------------------------------------
    // Viewport
    // ---------------------------------------------------------------------

    /// Scroll to `scroll_top`, clamped to the scrollable range.
    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        let clamped = self.clamp_scroll(scroll_top);
        if clamped == self.metrics.scroll_top {
            return;
        }
        self.metrics.scroll_top = clamped;
        tracing::trace!(
            target: TRACE_TARGET,
            scroll_top = clamped,
            range = ?self.visible_range(),
            "scrolled"
        );
        self.mark_modified(ChangeKind::Viewport);
    }

    /// Update row height and viewport height (e.g. after a font or window resize).
    pub fn set_viewport(&mut self, line_height: f64, viewport_height: f64) {
        if self.metrics.line_height == line_height
            && self.metrics.viewport_height == viewport_height
        {
            return;
        }
        self.metrics.line_height = line_height;
        self.metrics.viewport_height = viewport_height;
        self.metrics.scroll_top = self.clamp_scroll(self.metrics.scroll_top);
        tracing::trace!(
            target: TRACE_TARGET,
            line_height,
            viewport_height,
            range = ?self.visible_range(),
            "viewport resized"
        );
        self.mark_modified(ChangeKind::Viewport);
    }

    /// Toggle inline-diff display.
    pub fn set_inline_diff(&mut self, enabled: bool) {
        if self.inline_diff == enabled {
            return;
        }
        self.inline_diff = enabled;
        self.rebuild_rows();
        self.mark_modified(ChangeKind::Diff);
        self.reveal_cursor();
    }

    fn clamp_scroll(&self, scroll_top: f64) -> f64 {
        let max = self.viewport.max_scroll_top(
            self.row_count(),
            self.metrics.line_height,
            self.metrics.viewport_height,
        );
        if scroll_top.is_finite() {
            scroll_top.clamp(0.0, max)
        } else {
            0.0
        }
    }

    fn cursor_row(&self) -> u32 {
        let line = self.cursor.position().line;
        if self.inline_diff {
            row_for_buffer_line(&self.rows, line).unwrap_or(line)
        } else {
            line
        }
    }

    fn reveal_cursor(&mut self) {
        let target = self.viewport.scroll_top_to_reveal(
            self.cursor_row(),
            self.metrics.scroll_top,
            self.metrics.line_height,
            self.metrics.viewport_height,
        );
        self.set_scroll_top(target);
    }

    // ---------------------------------------------------------------------
    // Diff synchronisation
    // ---------------------------------------------------------------------

    /// Emit a diff request if an edit is pending and its debounce window elapsed at `now`.
    pub fn poll_diff_request(&mut self, now: Instant) -> Option<DiffRequest> {
        let request = self.diff_sync.poll(now, &self.lines)?;
        tracing::debug!(
            target: TRACE_TARGET,
            fingerprint = request.fingerprint.as_u64(),
            "diff requested after debounce"
        );
        Some(request)
    }

    /// Emit a diff request for the current content immediately (e.g. on open or save).
    pub fn request_diff(&mut self) -> DiffRequest {
        let request = self.diff_sync.request_now(&self.lines);
        tracing::debug!(
            target: TRACE_TARGET,
            fingerprint = request.fingerprint.as_u64(),
            "diff requested"
        );
        request
    }

    /// The diff sync state (debounce interval, pending edit, latest request).
    pub fn diff_sync(&self) -> &DiffSync {
        &self.diff_sync
    }

    /// Apply a diff response if `fingerprint` answers the latest request; drop it otherwise.
    pub fn accept_diff(
        &mut self,
        fingerprint: Fingerprint,
        diff_lines: Vec<DiffLine>,
    ) -> DiffOutcome {
        if !self.diff_sync.is_current(fingerprint) {
            tracing::debug!(
                target: TRACE_TARGET,
                fingerprint = fingerprint.as_u64(),
                latest = ?self.diff_sync.latest().map(Fingerprint::as_u64),
                "dropping stale diff response"
            );
            return DiffOutcome::Stale;
        }

        if diff_lines == self.diff_lines {
            return DiffOutcome::Applied;
        }
        self.change_set = classify(&diff_lines);
        self.diff_lines = diff_lines;
        self.rebuild_rows();
        self.metrics.scroll_top = self.clamp_scroll(self.metrics.scroll_top);
        self.mark_modified(ChangeKind::Diff);
        DiffOutcome::Applied
    }

    fn rebuild_rows(&mut self) {
        self.rows = if self.inline_diff {
            unify(&self.lines, &self.diff_lines)
        } else {
            plain_lines(&self.lines)
        };
    }

    // ---------------------------------------------------------------------
    // Decorations
    // ---------------------------------------------------------------------

    /// Add a decoration.
    pub fn add_decoration(&mut self, spec: DecorationSpec) -> DecorationId {
        let id = self.decorations.add(spec);
        self.mark_modified(ChangeKind::Decorations);
        id
    }

    /// Remove a decoration. Returns `true` if it existed.
    pub fn remove_decoration(&mut self, id: DecorationId) -> bool {
        let removed = self.decorations.remove(id).is_some();
        if removed {
            self.mark_modified(ChangeKind::Decorations);
        }
        removed
    }

    /// Highlight every match of `query` with an inline decoration of `class_name`, replacing the
    /// previous set of search highlights. Returns the number of matches.
    pub fn highlight_matches(
        &mut self,
        query: &str,
        options: SearchOptions,
        class_name: &str,
    ) -> Result<usize, SearchError> {
        let ranges = find_all(&self.lines, query, options)?;
        let count = ranges.len();
        let specs = ranges
            .into_iter()
            .map(|range| DecorationSpec::new(range, DecorationKind::Inline, class_name));

        let old = mem::take(&mut self.search_highlights);
        let had_old = !old.is_empty();
        self.search_highlights = self.decorations.replace(old, specs);
        if had_old || count > 0 {
            self.mark_modified(ChangeKind::Decorations);
        }
        Ok(count)
    }

    /// Remove all search highlights.
    pub fn clear_highlights(&mut self) {
        let old = mem::take(&mut self.search_highlights);
        if self.decorations.remove_all(old) > 0 {
            self.mark_modified(ChangeKind::Decorations);
        }
    }

    // ---------------------------------------------------------------------
    // Versioning
    // ---------------------------------------------------------------------

    /// Current state version; starts at 0 and increments on every change.
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Check if state has changed since `version`.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Subscribe to state changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SessionChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Record a change made outside the session's own methods and notify subscribers.
    pub fn mark_modified(&mut self, kind: ChangeKind) {
        let old_version = self.state_version;
        self.state_version += 1;
        let change = SessionChange {
            kind,
            old_version,
            new_version: self.state_version,
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn session(text: &str) -> EditorSession {
        let mut session = EditorSession::from_text(text, ViewConfig::default());
        session.set_viewport(10.0, 100.0);
        session
    }

    #[test]
    fn test_version_only_moves_on_real_change() {
        let mut s = session("abc\ndef");
        let v = s.version();

        s.set_cursor(0);
        assert_eq!(s.version(), v);
        assert!(!s.move_cursor(Motion::Up, false));
        assert_eq!(s.version(), v);

        assert!(s.move_cursor(Motion::Down, false));
        assert!(s.has_changed_since(v));
    }

    #[test]
    fn test_subscribers_see_change_kinds() {
        let mut s = session("abc\ndef");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        s.subscribe(move |change| sink.lock().unwrap().push(change.kind));

        s.move_cursor(Motion::Right, false);
        s.move_cursor(Motion::Right, true);
        s.apply_edit(vec!["xyz".into()], 1, Instant::now());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ChangeKind::Cursor, ChangeKind::Selection, ChangeKind::Document]
        );
    }

    #[test]
    fn test_stale_diff_is_dropped() {
        let mut s = session("a\nb");
        let first = s.request_diff();
        s.apply_edit(vec!["a".into(), "B".into()], 0, Instant::now());
        let v = s.version();

        let outcome = s.accept_diff(first.fingerprint, vec![DiffLine::added(2, "b")]);
        assert_eq!(outcome, DiffOutcome::Stale);
        assert!(s.change_set().is_empty());
        assert_eq!(s.version(), v);
    }

    #[test]
    fn test_edit_schedules_debounced_request() {
        let mut s = session("a");
        let now = Instant::now();
        s.apply_edit(vec!["ab".into()], 2, now);

        assert!(s.poll_diff_request(now + Duration::from_millis(100)).is_none());
        let request = s
            .poll_diff_request(now + Duration::from_millis(500))
            .unwrap();
        assert_eq!(request.fingerprint, Fingerprint::of_lines(&["ab"]));
        assert!(s.poll_diff_request(now + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_render_rows_carry_gutter_and_decorations() {
        let mut s = session("a\nB\nc");
        let request = s.request_diff();
        s.accept_diff(
            request.fingerprint,
            vec![DiffLine::removed(2, "b"), DiffLine::added(2, "B")],
        );
        let id = s.add_decoration(DecorationSpec::new(
            crate::Range::from_offsets(2, 3, s.lines()),
            DecorationKind::Line,
            "current",
        ));

        let rows = s.render_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].gutter_mark, None);
        assert_eq!(rows[1].gutter_mark, Some(GutterMark::Modified));
        assert_eq!(rows[1].decorations[0].id, id);
        assert!(rows[2].decorations.is_empty());
    }

    #[test]
    fn test_inline_toggle_changes_layout() {
        let mut s = session("a\nc");
        let request = s.request_diff();
        s.accept_diff(
            request.fingerprint,
            vec![
                DiffLine::context(1, 1, "a"),
                DiffLine::removed(2, "b"),
                DiffLine::context(3, 2, "c"),
            ],
        );
        assert_eq!(s.row_count(), 2);
        assert_eq!(s.change_set().deleted_before(1), Some(1));

        s.set_inline_diff(true);
        let rows = s.render_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].kind, UnifiedLineKind::DiffOnly);
        assert_eq!(rows[1].content, "b");
        assert_eq!(rows[2].buffer_line_index, Some(1));
        assert_eq!(rows[2].deleted_above, Some(1));
    }

    #[test]
    fn test_cursor_motion_reveals_line() {
        let text = (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut s = session(&text);
        // 10 rows fit; PageDown(30) lands on line 30, so its bottom edge (310) must be in view.
        s.move_cursor(Motion::PageDown(30), false);
        assert_eq!(s.cursor().position.line, 30);
        assert_eq!(s.metrics().scroll_top, 210.0);
        assert!(s.visible_range().contains(30));
    }

    #[test]
    fn test_highlight_matches_replaces_previous_set() {
        let mut s = session("foo bar\nfoo");
        assert_eq!(
            s.highlight_matches("foo", SearchOptions::default(), "match")
                .unwrap(),
            2
        );
        assert_eq!(s.decorations().len(), 2);

        assert_eq!(
            s.highlight_matches("bar", SearchOptions::default(), "match")
                .unwrap(),
            1
        );
        assert_eq!(s.decorations().len(), 1);
        assert!(s.decorations().for_line(1).is_empty());

        s.clear_highlights();
        assert!(s.decorations().is_empty());
    }
}
