//! Structured diff input.
//!
//! The view core never computes diffs. An external engine (a VCS binary or a line-diff library)
//! produces a flat, ordered sequence of [`DiffLine`]s per file, and the
//! [`classify`](crate::change_set::classify) / [`unify`](crate::unified::unify) passes consume it.
//!
//! Line numbers are **1-based**, as printed by `git diff`. Numbering that violates the per-kind
//! invariants is tolerated: consumers skip the offending line and log the anomaly instead of
//! failing.

/// The role of a line within a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffLineKind {
    /// Hunk boundary marker (`@@ -a,b +c,d @@`), kept as raw text only.
    Header,
    /// Line present only in the new (current) text.
    Added,
    /// Line present only in the old (base) text.
    Removed,
    /// Unchanged line present in both texts.
    Context,
}

/// One line of a structured diff.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiffLine {
    /// Line role.
    pub kind: DiffLineKind,
    /// Line text without the diff prefix and without a line terminator.
    pub content: String,
    /// 1-based line number in the base text (`Removed` and `Context` only).
    pub old_line_number: Option<u32>,
    /// 1-based line number in the current text (`Added` and `Context` only).
    pub new_line_number: Option<u32>,
}

impl DiffLine {
    /// A hunk header line.
    pub fn header(content: impl Into<String>) -> Self {
        Self {
            kind: DiffLineKind::Header,
            content: content.into(),
            old_line_number: None,
            new_line_number: None,
        }
    }

    /// A line added at `new_line_number` (1-based).
    pub fn added(new_line_number: u32, content: impl Into<String>) -> Self {
        Self {
            kind: DiffLineKind::Added,
            content: content.into(),
            old_line_number: None,
            new_line_number: Some(new_line_number),
        }
    }

    /// A line removed from `old_line_number` (1-based).
    pub fn removed(old_line_number: u32, content: impl Into<String>) -> Self {
        Self {
            kind: DiffLineKind::Removed,
            content: content.into(),
            old_line_number: Some(old_line_number),
            new_line_number: None,
        }
    }

    /// An unchanged line present at both line numbers (1-based).
    pub fn context(old_line_number: u32, new_line_number: u32, content: impl Into<String>) -> Self {
        Self {
            kind: DiffLineKind::Context,
            content: content.into(),
            old_line_number: Some(old_line_number),
            new_line_number: Some(new_line_number),
        }
    }

    /// Zero-based index of this line in the current buffer, if it has one.
    ///
    /// A `new_line_number` of `0` is malformed and yields `None`.
    pub fn new_index(&self) -> Option<u32> {
        self.new_line_number.and_then(|n| n.checked_sub(1))
    }

    /// Zero-based index of this line in the base text, if it has one.
    pub fn old_index(&self) -> Option<u32> {
        self.old_line_number.and_then(|n| n.checked_sub(1))
    }

    /// Returns `true` for [`DiffLineKind::Removed`].
    pub fn is_removed(&self) -> bool {
        self.kind == DiffLineKind::Removed
    }

    /// Returns `true` for [`DiffLineKind::Added`].
    pub fn is_added(&self) -> bool {
        self.kind == DiffLineKind::Added
    }
}
