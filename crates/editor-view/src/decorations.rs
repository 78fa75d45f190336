//! Decoration data model and line-indexed store.
//!
//! Decorations are host-facing annotations anchored to document [`Range`]s without modifying the
//! text: gutter markers, whole-line backgrounds, inline highlights (search matches, bracket
//! matches), optionally carrying virtual text. The view core only stores and looks them up;
//! painting is up to the host.
//!
//! The [`DecorationIndex`] keeps an arena of decorations ordered by id plus a secondary
//! `line -> ids` multimap, so per-line lookup during rendering does not scan the arena.
//! Lifetime is explicit: a decoration lives until it is removed.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use ahash::AHashMap;

use crate::position::Range;

/// Store-generated, caller-opaque decoration identifier.
///
/// Ids are monotonic per [`DecorationIndex`] and never reused while the index lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationId(u64);

impl DecorationId {
    /// Raw numeric value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DecorationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dec-{}", self.0)
    }
}

/// How a decoration attaches to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    /// A marker in the line-number column of the start line.
    Gutter,
    /// A span inside the text; may cover several lines.
    Inline,
    /// A whole-line treatment (e.g. background) of the start line.
    Line,
}

/// Everything needed to create a decoration; the index assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationSpec {
    /// Anchor range.
    pub range: Range,
    /// Attachment kind.
    pub kind: DecorationKind,
    /// Host style hook (e.g. a CSS class or theme key).
    pub class_name: String,
    /// Optional virtual text or tooltip payload.
    pub content: Option<String>,
}

impl DecorationSpec {
    /// Create a spec without content.
    pub fn new(range: Range, kind: DecorationKind, class_name: impl Into<String>) -> Self {
        Self {
            range,
            kind,
            class_name: class_name.into(),
            content: None,
        }
    }

    /// Attach virtual text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// A stored decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Identifier assigned by the index.
    pub id: DecorationId,
    /// Anchor range.
    pub range: Range,
    /// Attachment kind.
    pub kind: DecorationKind,
    /// Host style hook.
    pub class_name: String,
    /// Optional virtual text or tooltip payload.
    pub content: Option<String>,
}

impl Decoration {
    /// Lines this decoration is reported on by [`DecorationIndex::for_line`].
    ///
    /// `Gutter` and `Line` decorations belong to their start line only. `Inline` decorations
    /// belong to every line they intersect; a multi-line range that ends at column 0 does not
    /// reach into its end line.
    pub fn lines(&self) -> RangeInclusive<u32> {
        let start = self.range.start.line;
        match self.kind {
            DecorationKind::Gutter | DecorationKind::Line => start..=start,
            DecorationKind::Inline => {
                let end = &self.range.end;
                let last = if end.line > start && end.column == 0 {
                    end.line - 1
                } else {
                    end.line.max(start)
                };
                start..=last
            }
        }
    }
}

/// Keyed decoration store with per-line lookup.
#[derive(Debug, Default)]
pub struct DecorationIndex {
    next_id: u64,
    entries: BTreeMap<DecorationId, Decoration>,
    by_line: AHashMap<u32, Vec<DecorationId>>,
}

impl DecorationIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoration and return its new id.
    pub fn add(&mut self, spec: DecorationSpec) -> DecorationId {
        self.next_id += 1;
        let id = DecorationId(self.next_id);
        let decoration = Decoration {
            id,
            range: spec.range,
            kind: spec.kind,
            class_name: spec.class_name,
            content: spec.content,
        };

        for line in decoration.lines() {
            self.by_line.entry(line).or_default().push(id);
        }
        self.entries.insert(id, decoration);
        id
    }

    /// Remove a decoration. Unknown ids are ignored.
    pub fn remove(&mut self, id: DecorationId) -> Option<Decoration> {
        let decoration = self.entries.remove(&id)?;
        for line in decoration.lines() {
            if let Some(ids) = self.by_line.get_mut(&line) {
                ids.retain(|candidate| *candidate != id);
                if ids.is_empty() {
                    self.by_line.remove(&line);
                }
            }
        }
        Some(decoration)
    }

    /// Remove every decoration in `ids`, returning how many were actually present.
    pub fn remove_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = DecorationId>,
    {
        ids.into_iter()
            .filter(|id| self.remove(*id).is_some())
            .count()
    }

    /// Swap a set of decorations for a new one: the new set is added first, then the old set is
    /// removed. Returns the ids of the new set in input order.
    pub fn replace<I, S>(&mut self, old_ids: I, new_specs: S) -> Vec<DecorationId>
    where
        I: IntoIterator<Item = DecorationId>,
        S: IntoIterator<Item = DecorationSpec>,
    {
        let old_ids: Vec<DecorationId> = old_ids.into_iter().collect();
        let new_ids: Vec<DecorationId> = new_specs.into_iter().map(|s| self.add(s)).collect();
        self.remove_all(old_ids);
        new_ids
    }

    /// Decorations reported on `line`, in insertion order.
    pub fn for_line(&self, line: u32) -> Vec<&Decoration> {
        self.by_line
            .get(&line)
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default()
    }

    /// Look up a decoration by id.
    pub fn get(&self, id: DecorationId) -> Option<&Decoration> {
        self.entries.get(&id)
    }

    /// Iterate over all decorations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.entries.values()
    }

    /// Number of stored decorations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no decorations are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every decoration. Ids keep counting up from where they were.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_line.clear();
    }
}
