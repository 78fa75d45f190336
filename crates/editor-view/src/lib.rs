#![warn(missing_docs)]
//! Editor View - Headless Text-View Core for Code Editors
//!
//! # Overview
//!
//! `editor-view` is the rendering/state core of a code editor's text view. It turns a mutable
//! line buffer plus an optional version-control diff into:
//!
//! - a small, stable window of lines to materialize for virtualized rendering
//! - a bidirectional mapping between linear offsets and (line, column) positions
//! - a per-line classification of added / modified / deleted content for the gutter
//!
//! It neither stores text history nor computes diffs nor paints anything: the host owns the
//! buffer, runs the diff engine asynchronously and renders the [`RenderRow`]s it is handed.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorSession (versioning, subscriptions)  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  DiffSync (fingerprints, debounce)          │  ← Async diff contract
//! ├──────────────────────┬──────────────────────┤
//! │  Viewport            │  CursorMachine       │  ← View state
//! ├──────────────────────┼──────────────────────┤
//! │  classify / unify    │  DecorationIndex     │  ← Per-line annotations
//! ├──────────────────────┴──────────────────────┤
//! │  Position conversion (UTF-16 columns)       │  ← Coordinates
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_view::{DiffLine, classify, offset_to_position, unify, visible_range};
//!
//! let lines = ["a", "B", "c"];
//!
//! // Offsets count one unit per line break.
//! let pos = offset_to_position(3, &lines);
//! assert_eq!((pos.line, pos.column), (1, 1));
//!
//! // Gutter classification of an externally computed diff.
//! let diff = vec![DiffLine::removed(2, "b"), DiffLine::added(2, "B")];
//! let changes = classify(&diff);
//! assert!(changes.modified.contains(&1));
//!
//! // Inline-diff rows: the deleted "b" is shown right before "B".
//! assert_eq!(unify(&lines, &diff).len(), 4);
//!
//! // Lines to materialize for a 200px viewport of 20px rows.
//! let range = visible_range(0.0, 20.0, 200.0, 1_000);
//! assert_eq!((range.start, range.end), (0, 20));
//! ```
//!
//! # Module Description
//!
//! - [`position`] - Offset ↔ (line, column) conversion
//! - [`viewport`] - Visible-range computation with adaptive overscan
//! - [`diff`] - Flat diff line model
//! - [`change_set`] - Diff → added / modified / deleted gutter buckets
//! - [`unified`] - Buffer + diff → interleaved inline-diff rows
//! - [`decorations`] - Decoration store with per-line lookup
//! - [`cursor`] - Cursor / selection state machine
//! - [`diff_sync`] - Fingerprinted diff requests and debouncing
//! - [`search`] - Match finding for highlight decorations
//! - [`config`] - TOML view configuration
//! - [`session`] - Per-document composition of all of the above
//!
//! # Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber. Targets:
//! `editor_view::diff` (malformed diff lines, classification summaries) and
//! `editor_view::session` (diff requests, stale responses, edits, scrolling).

pub mod change_set;
pub mod config;
pub mod cursor;
pub mod decorations;
pub mod diff;
pub mod diff_sync;
mod error;
pub mod position;
pub mod search;
pub mod session;
mod text;
pub mod unified;
pub mod viewport;

pub use change_set::{ChangeSet, GutterMark, classify};
pub use config::{DEFAULT_DEBOUNCE_MS, DiffConfig, ViewConfig};
pub use cursor::{CursorMachine, CursorState, Motion, SelectionMode};
pub use decorations::{Decoration, DecorationId, DecorationIndex, DecorationKind, DecorationSpec};
pub use diff::{DiffLine, DiffLineKind};
pub use diff_sync::{DEFAULT_DEBOUNCE, DiffRequest, DiffSync, Fingerprint};
pub use error::{ConfigError, SearchError};
pub use position::{
    Position, Range, clamp_signed_offset, document_len, line_len_utf16, offset_to_position,
    position_to_offset,
};
pub use search::{SearchOptions, find_all};
pub use session::{
    ChangeKind, DiffOutcome, EditorSession, RenderRow, SessionChange, SessionChangeCallback,
    ViewportMetrics,
};
pub use text::split_lines;
pub use unified::{UnifiedLine, UnifiedLineKind, plain_lines, row_for_buffer_line, unify};
pub use viewport::{
    DEFAULT_MIN_OVERSCAN, DEFAULT_OVERSCAN_RATIO, DEFAULT_PAD_LINES, Viewport, ViewportConfig,
    VisibleRange, scroll_height, visible_range,
};
