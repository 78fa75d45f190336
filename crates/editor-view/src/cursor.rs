//! Cursor and selection state machine.
//!
//! [`CursorMachine`] owns the caret position, the optional selection and the *desired column*
//! that keeps vertical navigation stable when passing through short lines. It has two states:
//!
//! - **Idle**: no selection (anchor and caret coincide)
//! - **Selecting**: a non-empty selection between an anchor and the caret
//!
//! All inputs are clamped against the line array they are given; nothing here fails.

use unicode_segmentation::UnicodeSegmentation;

use crate::position::{
    Position, Range, clamp_u32, line_len_utf16, offset_to_position, position_to_offset,
};

/// Snapshot of the caret, selection and vertical-motion memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    /// Caret (active end of the selection).
    pub position: Position,
    /// Non-empty selection, normalized so `start.offset <= end.offset`.
    pub selection: Option<Range>,
    /// Column to aim for during a run of vertical motions.
    pub desired_column: Option<u32>,
}

/// Whether a selection is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Caret only.
    Idle,
    /// A non-empty selection exists.
    Selecting,
}

/// Caret motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// One line up; a no-op on the first line.
    Up,
    /// One line down; a no-op on the last line.
    Down,
    /// One grapheme cluster left; never wraps to the previous line.
    Left,
    /// One grapheme cluster right; never wraps to the next line.
    Right,
    /// Column 0 of the current line.
    LineStart,
    /// End of the current line.
    LineEnd,
    /// Up by the given number of lines, stopping at the first line.
    PageUp(u32),
    /// Down by the given number of lines, stopping at the last line.
    PageDown(u32),
}

impl Motion {
    fn is_vertical(self) -> bool {
        matches!(
            self,
            Motion::Up | Motion::Down | Motion::PageUp(_) | Motion::PageDown(_)
        )
    }
}

/// The cursor/selection state machine.
#[derive(Debug, Clone, Default)]
pub struct CursorMachine {
    state: CursorState,
    anchor: Option<Position>,
}

impl CursorMachine {
    /// A caret at the start of the document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot.
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Caret position.
    pub fn position(&self) -> Position {
        self.state.position
    }

    /// Current selection, if non-empty.
    pub fn selection(&self) -> Option<Range> {
        self.state.selection
    }

    /// Current state-machine mode.
    pub fn mode(&self) -> SelectionMode {
        if self.state.selection.is_some() {
            SelectionMode::Selecting
        } else {
            SelectionMode::Idle
        }
    }

    /// Apply a selection input event (mouse click, drag, programmatic select).
    ///
    /// Equal bounds leave the machine `Idle` with the caret at that offset; different bounds
    /// enter `Selecting` with the caret on `active_offset`. Either way the desired column is
    /// forgotten.
    pub fn set_selection<S: AsRef<str>>(
        &mut self,
        anchor_offset: u32,
        active_offset: u32,
        lines: &[S],
    ) {
        let anchor = offset_to_position(anchor_offset, lines);
        let active = offset_to_position(active_offset, lines);
        self.state.desired_column = None;
        self.select_between(anchor, active);
    }

    /// Place the caret at `offset` and drop any selection.
    pub fn set_position<S: AsRef<str>>(&mut self, offset: u32, lines: &[S]) {
        self.set_selection(offset, offset, lines);
    }

    /// Drop the selection, keeping the caret where it is.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
        self.state.selection = None;
    }

    /// Apply a caret motion. With `extend` the selection grows from its anchor (Shift+motion);
    /// without it any selection collapses. Returns `true` if the state changed.
    pub fn move_cursor<S: AsRef<str>>(
        &mut self,
        motion: Motion,
        extend: bool,
        lines: &[S],
    ) -> bool {
        let before = self.state;
        let current = Position::clamped(
            self.state.position.line,
            self.state.position.column,
            lines,
        );

        if motion.is_vertical() {
            let Some(target) = self.vertical_target(current, motion, lines) else {
                return false;
            };
            self.state.desired_column = Some(self.state.desired_column.unwrap_or(current.column));
            self.commit(current, target, extend);
        } else {
            self.state.desired_column = None;
            if !extend && let Some(selection) = self.state.selection {
                match motion {
                    Motion::Left => {
                        self.commit(current, selection.start, false);
                        return self.state != before;
                    }
                    Motion::Right => {
                        self.commit(current, selection.end, false);
                        return self.state != before;
                    }
                    _ => {}
                }
            }
            let target = horizontal_target(current, motion, lines);
            self.commit(current, target, extend);
        }

        self.state != before
    }

    /// An edit replaced the buffer: forget vertical memory and selection, and resolve the caret
    /// offset against the new lines.
    pub fn apply_edit<S: AsRef<str>>(&mut self, lines: &[S], cursor_offset: u32) {
        self.state = CursorState {
            position: offset_to_position(cursor_offset, lines),
            selection: None,
            desired_column: None,
        };
        self.anchor = None;
    }

    /// Re-clamp caret, anchor and selection after the lines changed underneath the machine
    /// (e.g. a line the caret was on has been deleted by another view).
    pub fn revalidate<S: AsRef<str>>(&mut self, lines: &[S]) {
        let reclamp = |p: Position| Position::clamped(p.line, p.column, lines);
        let active = reclamp(self.state.position);
        match self.anchor.map(reclamp) {
            Some(anchor) => self.select_between(anchor, active),
            None => {
                self.state.position = active;
                self.state.selection = None;
            }
        }
    }

    fn vertical_target<S: AsRef<str>>(
        &self,
        current: Position,
        motion: Motion,
        lines: &[S],
    ) -> Option<Position> {
        let last_line = clamp_u32(lines.len().saturating_sub(1));
        let target_line = match motion {
            Motion::Up => current.line.checked_sub(1)?,
            Motion::Down => {
                if current.line >= last_line {
                    return None;
                }
                current.line + 1
            }
            Motion::PageUp(n) => current.line.saturating_sub(n),
            Motion::PageDown(n) => current.line.saturating_add(n).min(last_line),
            _ => return None,
        };

        let column = self.state.desired_column.unwrap_or(current.column);
        Some(Position::clamped(target_line, column, lines))
    }

    fn commit(&mut self, current: Position, target: Position, extend: bool) {
        if extend {
            let anchor = self.anchor.unwrap_or(current);
            self.select_between(anchor, target);
        } else {
            self.state.position = target;
            self.clear_selection();
        }
    }

    fn select_between(&mut self, anchor: Position, active: Position) {
        self.state.position = active;
        if anchor.offset == active.offset {
            self.anchor = None;
            self.state.selection = None;
        } else {
            self.anchor = Some(anchor);
            self.state.selection = Some(Range::normalized(anchor, active));
        }
    }
}

fn horizontal_target<S: AsRef<str>>(current: Position, motion: Motion, lines: &[S]) -> Position {
    let text = lines
        .get(current.line as usize)
        .map(|l| l.as_ref())
        .unwrap_or("");
    let column = match motion {
        Motion::Left => prev_grapheme_column(text, current.column),
        Motion::Right => next_grapheme_column(text, current.column),
        Motion::LineStart => 0,
        Motion::LineEnd => line_len_utf16(text),
        _ => current.column,
    };
    offset_to_position(position_to_offset(current.line, column, lines), lines)
}

/// UTF-16 column of the grapheme boundary before `column` (0 at line start).
pub(crate) fn prev_grapheme_column(line: &str, column: u32) -> u32 {
    let mut last = 0u32;
    let mut at = 0u32;
    for grapheme in line.graphemes(true) {
        if at >= column {
            break;
        }
        last = at;
        at = at.saturating_add(clamp_u32(grapheme.encode_utf16().count()));
    }
    last
}

/// UTF-16 column of the grapheme boundary after `column` (line length at line end).
pub(crate) fn next_grapheme_column(line: &str, column: u32) -> u32 {
    let mut at = 0u32;
    for grapheme in line.graphemes(true) {
        at = at.saturating_add(clamp_u32(grapheme.encode_utf16().count()));
        if at > column {
            return at;
        }
    }
    at
}
