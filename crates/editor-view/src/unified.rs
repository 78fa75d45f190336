//! Inline-diff line unification.
//!
//! [`unify`] interleaves the live buffer with the lines the diff says were deleted, producing
//! the single ordered sequence an inline-diff view renders. Buffer lines keep their order and
//! appear exactly once; every removed diff line appears exactly once as a
//! [`UnifiedLineKind::DiffOnly`] row, right before the buffer line that replaced or follows it.

use crate::diff::{DiffLine, DiffLineKind};
use crate::position::clamp_u32;

const TRACE_TARGET: &str = "editor_view::diff";

/// Where a unified row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnifiedLineKind {
    /// A line of the live buffer.
    Buffer,
    /// A line that exists only in the diff base (deleted from the buffer).
    DiffOnly,
}

/// One row of the unified (inline-diff) view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedLine {
    /// Row origin.
    pub kind: UnifiedLineKind,
    /// Index into the buffer for `Buffer` rows; `None` for `DiffOnly` rows.
    pub buffer_line_index: Option<u32>,
    /// Text to render.
    pub content: String,
    /// The diff line this row was matched with, if any.
    pub diff_line: Option<DiffLine>,
}

impl UnifiedLine {
    fn buffer(index: usize, content: &str, diff_line: Option<DiffLine>) -> Self {
        Self {
            kind: UnifiedLineKind::Buffer,
            buffer_line_index: Some(clamp_u32(index)),
            content: content.to_string(),
            diff_line,
        }
    }

    fn diff_only(diff_line: DiffLine) -> Self {
        Self {
            kind: UnifiedLineKind::DiffOnly,
            buffer_line_index: None,
            content: diff_line.content.clone(),
            diff_line: Some(diff_line),
        }
    }

    /// Returns `true` for rows that come from the live buffer.
    pub fn is_buffer(&self) -> bool {
        self.kind == UnifiedLineKind::Buffer
    }
}

/// One `Buffer` row per line, without any diff information.
///
/// This is what the view shows when inline-diff display is off or no diff is available.
pub fn plain_lines<S: AsRef<str>>(buffer_lines: &[S]) -> Vec<UnifiedLine> {
    buffer_lines
        .iter()
        .enumerate()
        .map(|(idx, line)| UnifiedLine::buffer(idx, line.as_ref(), None))
        .collect()
}

/// Interleave `buffer_lines` with the removed lines of `diff_lines`.
///
/// Header lines only close the current hunk. Added/Context lines without a usable
/// `new_line_number` are skipped (logged), leaving any queued removals for the next anchored
/// line. Removals that no line of their hunk follows are placed at their base position moved
/// by the net shift of the lines before them, which is the end of file for trailing deletions.
pub fn unify<S: AsRef<str>>(buffer_lines: &[S], diff_lines: &[DiffLine]) -> Vec<UnifiedLine> {
    if diff_lines.is_empty() {
        return plain_lines(buffer_lines);
    }

    let mut unifier = Unifier {
        buffer_lines,
        out: Vec::with_capacity(buffer_lines.len() + diff_lines.len()),
        buffer_cursor: 0,
        pending_removed: Vec::new(),
        pending_slot: None,
        shift: 0,
    };

    for (idx, line) in diff_lines.iter().enumerate() {
        match line.kind {
            DiffLineKind::Header => unifier.close_hunk(),
            DiffLineKind::Removed => {
                if unifier.pending_removed.is_empty() {
                    unifier.pending_slot = line.old_index().map(|old| {
                        let slot = i64::from(old) + unifier.shift;
                        usize::try_from(slot.max(0)).unwrap_or(usize::MAX)
                    });
                }
                unifier.pending_removed.push(line.clone());
                unifier.shift -= 1;
            }
            DiffLineKind::Added | DiffLineKind::Context => {
                if line.kind == DiffLineKind::Added {
                    unifier.shift += 1;
                }
                let Some(target) = line.new_index() else {
                    tracing::warn!(
                        target: TRACE_TARGET,
                        index = idx,
                        kind = ?line.kind,
                        "diff line without a usable new line number; skipping"
                    );
                    continue;
                };
                unifier.anchor(target as usize, idx, line);
            }
        }
    }

    unifier.close_hunk();
    unifier.flush_buffer_until(buffer_lines.len());
    unifier.out
}

struct Unifier<'a, S> {
    buffer_lines: &'a [S],
    out: Vec<UnifiedLine>,
    buffer_cursor: usize,
    pending_removed: Vec<DiffLine>,
    /// Buffer slot of the first pending removal, from its base position and the shift so far.
    pending_slot: Option<usize>,
    /// Net lines added minus removed so far.
    shift: i64,
}

impl<S: AsRef<str>> Unifier<'_, S> {
    fn flush_buffer_until(&mut self, target: usize) {
        while self.buffer_cursor < target && self.buffer_cursor < self.buffer_lines.len() {
            self.out.push(UnifiedLine::buffer(
                self.buffer_cursor,
                self.buffer_lines[self.buffer_cursor].as_ref(),
                None,
            ));
            self.buffer_cursor += 1;
        }
    }

    fn flush_removed(&mut self) {
        self.out
            .extend(self.pending_removed.drain(..).map(UnifiedLine::diff_only));
        self.pending_slot = None;
    }

    /// Emit the buffer line `target` tagged with `line`, preceded by any queued removals.
    fn anchor(&mut self, target: usize, idx: usize, line: &DiffLine) {
        self.flush_buffer_until(target);
        self.flush_removed();

        if let Some(content) = self.buffer_lines.get(self.buffer_cursor) {
            self.out.push(UnifiedLine::buffer(
                self.buffer_cursor,
                content.as_ref(),
                Some(line.clone()),
            ));
            self.buffer_cursor += 1;
        } else {
            tracing::warn!(
                target: TRACE_TARGET,
                index = idx,
                new_line = target + 1,
                buffer_len = self.buffer_lines.len(),
                "diff line points past the end of the buffer"
            );
        }
    }

    /// No later line of the hunk follows the queued removals: place them at their own slot.
    fn close_hunk(&mut self) {
        if self.pending_removed.is_empty() {
            return;
        }
        if let Some(slot) = self.pending_slot {
            self.flush_buffer_until(slot);
        }
        self.flush_removed();
    }
}

/// Row index of buffer line `line` within a unified sequence.
///
/// Binary search over the rows. Buffer rows are in buffer order, and a diff-only row sorts
/// with the buffer row that follows it, so each probe only skips the deletion run it lands in.
pub fn row_for_buffer_line(unified: &[UnifiedLine], line: u32) -> Option<u32> {
    let (mut lo, mut hi) = (0, unified.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match next_buffer_row(unified, mid) {
            Some((pos, idx)) if idx < line => lo = pos + 1,
            _ => hi = mid,
        }
    }
    let (pos, idx) = next_buffer_row(unified, lo)?;
    (idx == line).then(|| clamp_u32(pos))
}

/// First buffer row at or after `from`, as `(row, buffer_line_index)`.
fn next_buffer_row(unified: &[UnifiedLine], from: usize) -> Option<(usize, u32)> {
    unified
        .get(from..)?
        .iter()
        .enumerate()
        .find_map(|(offset, row)| row.buffer_line_index.map(|idx| (from + offset, idx)))
}
