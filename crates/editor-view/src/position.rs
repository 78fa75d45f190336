//! Offset ↔ position conversion.
//!
//! All coordinates are expressed in **UTF-16 code units**, which is what browser-style hosts and
//! most editor protocols use for columns. A document is an ordered slice of line strings without
//! their line terminators; every line boundary counts as exactly one unit of offset.
//!
//! Conversion never fails: out-of-range inputs are clamped to the nearest valid position, so a
//! cursor that still references a line which was just deleted degrades gracefully.

use std::cmp::Ordering;

/// A resolved location in the document.
///
/// `offset` always equals the sum of `len(line_i) + 1` over all lines before `line`, plus
/// `column`. Positions are recomputed after every buffer mutation and never cached across one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: u32,
    /// Zero-based column in UTF-16 code units, within `[0, len(line)]`.
    pub column: u32,
    /// Linear offset from the start of the document in UTF-16 code units.
    pub offset: u32,
}

impl Position {
    /// Resolve a (line, column) pair against `lines`, clamping both coordinates.
    pub fn clamped<S: AsRef<str>>(line: u32, column: u32, lines: &[S]) -> Self {
        let offset = position_to_offset(line, column, lines);
        offset_to_position(offset, lines)
    }

    /// The start of the document.
    pub fn origin() -> Self {
        Self::default()
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset
            .cmp(&other.offset)
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A span between two positions with `start.offset <= end.offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Range {
    /// Build a range from two positions in any order (e.g. a reversed mouse drag).
    pub fn normalized(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Build a range from two offsets in any order, resolving both against `lines`.
    pub fn from_offsets<S: AsRef<str>>(a: u32, b: u32, lines: &[S]) -> Self {
        Self::normalized(offset_to_position(a, lines), offset_to_position(b, lines))
    }

    /// Returns `true` if the range covers no text.
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Length of the range in UTF-16 code units.
    pub fn len(&self) -> u32 {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Returns `true` if `offset` lies within `[start, end]`.
    pub fn contains_offset(&self, offset: u32) -> bool {
        self.start.offset <= offset && offset <= self.end.offset
    }
}

/// Length of a single line in UTF-16 code units.
pub fn line_len_utf16(line: &str) -> u32 {
    clamp_u32(line.encode_utf16().count())
}

/// Total document length in UTF-16 code units, counting one unit per line break.
pub fn document_len<S: AsRef<str>>(lines: &[S]) -> u32 {
    let breaks = clamp_u32(lines.len().saturating_sub(1));
    lines
        .iter()
        .map(|line| line_len_utf16(line.as_ref()))
        .fold(breaks, u32::saturating_add)
}

/// Map a linear offset to a position.
///
/// Offsets past the end of the document clamp to the end of the last line. An offset that lands
/// exactly on a line break resolves to the end of the line before it. An empty `lines` slice is
/// treated as a single empty line.
pub fn offset_to_position<S: AsRef<str>>(offset: u32, lines: &[S]) -> Position {
    if lines.is_empty() {
        return Position::origin();
    }

    let offset = offset.min(document_len(lines));
    let mut line_start = 0u32;
    let last = lines.len() - 1;

    for (idx, line) in lines.iter().enumerate() {
        let len = line_len_utf16(line.as_ref());
        let line_end = line_start.saturating_add(len);
        if offset <= line_end || idx == last {
            let column = offset.saturating_sub(line_start).min(len);
            return Position {
                line: clamp_u32(idx),
                column,
                offset: line_start.saturating_add(column),
            };
        }
        line_start = line_end.saturating_add(1);
    }

    Position::origin()
}

/// Map a (line, column) pair to a linear offset.
///
/// `line` clamps to the last line and `column` to that line's length before summing.
pub fn position_to_offset<S: AsRef<str>>(line: u32, column: u32, lines: &[S]) -> u32 {
    if lines.is_empty() {
        return 0;
    }

    let line = (line as usize).min(lines.len() - 1);
    let before: u32 = lines[..line]
        .iter()
        .map(|l| line_len_utf16(l.as_ref()).saturating_add(1))
        .fold(0, u32::saturating_add);
    before.saturating_add(column.min(line_len_utf16(lines[line].as_ref())))
}

/// Clamp a signed offset (e.g. `cursor + delta` computed by a host) into the document.
pub fn clamp_signed_offset<S: AsRef<str>>(offset: i64, lines: &[S]) -> u32 {
    let max = i64::from(document_len(lines));
    // Range-checked above, the cast cannot truncate.
    offset.clamp(0, max) as u32
}

pub(crate) fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
