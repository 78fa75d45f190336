//! Gutter classification of a diff.
//!
//! [`classify`] reduces a flat diff to the minimal per-line signal a gutter needs: is a line new,
//! changed in place, or did some lines vanish right before it. It works on runs of lines rather
//! than tokens, so a changed word marks the whole line as modified.
//!
//! All indices in a [`ChangeSet`] are zero-based line indices of the **current** buffer.

use std::collections::{BTreeMap, BTreeSet};

use crate::diff::{DiffLine, DiffLineKind};
use crate::position::clamp_u32;

const TRACE_TARGET: &str = "editor_view::diff";

/// Gutter marker kind for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GutterMark {
    /// The line does not exist in the base text.
    Added,
    /// The line replaced a base line in place.
    Modified,
}

/// Per-line change buckets derived from a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Lines added relative to the base.
    pub added: BTreeSet<u32>,
    /// Lines changed in place.
    pub modified: BTreeSet<u32>,
    /// Anchor line → number of base lines deleted right before it.
    ///
    /// An anchor equal to the buffer's line count means the deletion happened at end of file.
    pub deleted: BTreeMap<u32, u32>,
}

impl ChangeSet {
    /// Returns `true` if the diff produced no gutter marks at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// The gutter mark for `line`, if any. `Modified` wins if a line is somehow in both sets.
    pub fn mark_for_line(&self, line: u32) -> Option<GutterMark> {
        if self.modified.contains(&line) {
            Some(GutterMark::Modified)
        } else if self.added.contains(&line) {
            Some(GutterMark::Added)
        } else {
            None
        }
    }

    /// Number of base lines deleted right before `line`, if any.
    pub fn deleted_before(&self, line: u32) -> Option<u32> {
        self.deleted.get(&line).copied()
    }

    /// Total number of deleted base lines across all anchors.
    pub fn total_deleted(&self) -> u32 {
        self.deleted.values().copied().fold(0, u32::saturating_add)
    }

    fn record_deletion(&mut self, anchor: u32, count: u32) {
        if count == 0 {
            return;
        }
        let entry = self.deleted.entry(anchor).or_insert(0);
        *entry = entry.saturating_add(count);
    }
}

/// Classify `diff_lines` into added / modified / deleted buckets.
///
/// A run of removed lines immediately followed by a run of added lines is a replacement: the
/// overlapping slots are modified, extra added lines are added, and extra removed lines are
/// recorded as one deletion right after the last replacement line. A removed run with no added
/// lines after it is a pure deletion, anchored at the line that follows it. `Context` and
/// `Header` lines only separate runs.
///
/// Lines with missing or zero line numbers contribute nothing; the anomaly is logged.
pub fn classify(diff_lines: &[DiffLine]) -> ChangeSet {
    let mut set = ChangeSet::default();
    // Net lines added minus removed before `i`; maps base line numbers to buffer lines.
    let mut shift = 0i64;
    let mut i = 0;

    while i < diff_lines.len() {
        let line = &diff_lines[i];
        match line.kind {
            DiffLineKind::Removed => {
                let removed_end = run_end(diff_lines, i, DiffLineKind::Removed);
                let added_end = run_end(diff_lines, removed_end, DiffLineKind::Added);
                let deleted_count = clamp_u32(removed_end - i);

                if added_end > removed_end {
                    record_replacement(
                        &mut set,
                        &diff_lines[removed_end..added_end],
                        deleted_count,
                    );
                } else {
                    record_pure_deletion(&mut set, diff_lines, i, removed_end, shift);
                }
                shift += (added_end - removed_end) as i64 - (removed_end - i) as i64;
                i = added_end;
            }
            DiffLineKind::Added => {
                match line.new_index() {
                    Some(index) => {
                        set.added.insert(index);
                    }
                    None => skip_malformed(i, line),
                }
                shift += 1;
                i += 1;
            }
            DiffLineKind::Context | DiffLineKind::Header => i += 1,
        }
    }

    tracing::debug!(
        target: TRACE_TARGET,
        added = set.added.len(),
        modified = set.modified.len(),
        deleted = set.total_deleted(),
        "classified diff"
    );
    set
}

fn run_end(lines: &[DiffLine], from: usize, kind: DiffLineKind) -> usize {
    from + lines[from..]
        .iter()
        .take_while(|line| line.kind == kind)
        .count()
}

fn record_replacement(set: &mut ChangeSet, added: &[DiffLine], deleted_count: u32) {
    let Some(base) = added.first().and_then(DiffLine::new_index) else {
        tracing::warn!(
            target: TRACE_TARGET,
            added = added.len(),
            removed = deleted_count,
            "replacement run without a usable new line number; skipping"
        );
        return;
    };

    let added_count = clamp_u32(added.len());
    let overlap = deleted_count.min(added_count);

    for k in 0..overlap {
        set.modified.insert(base.saturating_add(k));
    }
    for k in overlap..added_count {
        set.added.insert(base.saturating_add(k));
    }
    if deleted_count > added_count {
        set.record_deletion(base.saturating_add(added_count), deleted_count - added_count);
    }
}

fn record_pure_deletion(
    set: &mut ChangeSet,
    lines: &[DiffLine],
    start: usize,
    end: usize,
    shift: i64,
) {
    let count = clamp_u32(end - start);

    // The slot of the following line, else the base position of the first removed line moved
    // by the net shift of everything before it.
    let anchor = lines
        .get(end)
        .and_then(|next| next.new_line_number)
        .map(|n| n.saturating_sub(1))
        .or_else(|| {
            lines[start].old_line_number.map(|n| {
                let slot = i64::from(n.saturating_sub(1)) + shift;
                u32::try_from(slot.max(0)).unwrap_or(u32::MAX)
            })
        });

    match anchor {
        Some(anchor) => set.record_deletion(anchor, count),
        None => tracing::warn!(
            target: TRACE_TARGET,
            index = start,
            removed = count,
            "deletion run without any usable line number; skipping"
        ),
    }
}

fn skip_malformed(index: usize, line: &DiffLine) {
    tracing::warn!(
        target: TRACE_TARGET,
        index,
        kind = ?line.kind,
        old = ?line.old_line_number,
        new = ?line.new_line_number,
        "diff line with malformed numbering; skipping"
    );
}
