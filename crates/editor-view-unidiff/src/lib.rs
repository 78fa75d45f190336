#![warn(missing_docs)]
//! Unified diff adapter for `editor-view`.
//!
//! The view core consumes a flat [`DiffLine`](editor_view::DiffLine) sequence and never looks
//! at `@@` headers itself. This crate turns the text an external diff engine prints
//! (`git diff`, `diff -u`) into that sequence, numbering every line from its hunk header.
//!
//! # Example
//!
//! ```rust
//! use editor_view::{GutterMark, classify};
//! use editor_view_unidiff::parse_diff_lines;
//!
//! let patch = "\
//! diff --git a/src/lib.rs b/src/lib.rs
//! index 3b18e51..a0b6d2c 100644
//! --- a/src/lib.rs
//! +++ b/src/lib.rs
//! @@ -1,3 +1,3 @@
//!  fn a() {}
//! -fn b() {}
//! +fn b() -> u32 { 1 }
//!  fn c() {}
//! ";
//!
//! let changes = classify(&parse_diff_lines(patch));
//! assert_eq!(changes.mark_for_line(1), Some(GutterMark::Modified));
//! ```
//!
//! Malformed input never fails the whole parse: see [`parse_file_diffs`]. Warnings are logged
//! through [`tracing`] under the `editor_view_unidiff` target.

mod error;
mod hunk;
mod parser;

pub use error::UnidiffError;
pub use hunk::{HunkHeader, parse_hunk_header};
pub use parser::{FileDiff, parse_diff_lines, parse_file_diffs};
